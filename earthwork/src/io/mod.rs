//! File input and output helpers for survey surfaces and volume results.

pub mod landxml;

use std::fs::File;
use std::io::{self, Read, Write};

use crate::curve::VolumeCurve;
use crate::dtm::Tin;
use crate::geometry::Point3;

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes a string to a file, replacing any existing contents.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())
}

fn invalid(line: usize, msg: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("line {line}: {msg}"))
}

/// Parses `x,y,z` lines. Blank lines and lines starting with `#` are ignored,
/// as is a first data line that does not start with a number (a header).
pub fn parse_points_csv(contents: &str) -> io::Result<Vec<Point3>> {
    let mut pts = Vec::new();
    let mut first = true;
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        let header = first && parts[0].parse::<f64>().is_err();
        first = false;
        if header {
            continue;
        }
        if parts.len() < 3 {
            return Err(invalid(idx + 1, "expected x,y,z"));
        }
        let mut coords = [0.0; 3];
        for (c, part) in coords.iter_mut().zip(&parts) {
            *c = part.parse::<f64>().map_err(|e| invalid(idx + 1, e))?;
        }
        pts.push(Point3::from(coords));
    }
    Ok(pts)
}

/// Reads a CSV file of `x,y,z` survey points.
pub fn read_points_csv(path: &str) -> io::Result<Vec<Point3>> {
    parse_points_csv(&read_to_string(path)?)
}

/// Reads a surface either from a LandXML TIN (`.xml`) or from a CSV of
/// points triangulated on the XY plane.
pub fn read_surface(path: &str) -> io::Result<Tin> {
    if path.to_ascii_lowercase().ends_with(".xml") {
        landxml::read_landxml_surface(path)
    } else {
        Ok(Tin::from_points(read_points_csv(path)?))
    }
}

/// Formats a volume curve as CSV with a `level,cut,fill,net` header.
pub fn curve_to_csv(curve: &VolumeCurve) -> String {
    let mut out = String::from("level,cut,fill,net\n");
    for p in &curve.points {
        out.push_str(&format!(
            "{:.3},{:.3},{:.3},{:.3}\n",
            p.level, p.result.cut, p.result.fill, p.result.net
        ));
    }
    out
}

/// Writes a volume curve to a CSV file.
pub fn write_curve_csv(path: &str, curve: &VolumeCurve) -> io::Result<()> {
    write_string(path, &curve_to_csv(curve))
}

/// Writes any serializable value as pretty JSON.
pub fn write_json<T: serde::Serialize>(path: &str, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    write_string(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurvePoint;
    use crate::volume::VolumeResult;

    #[test]
    fn parse_points_with_header_and_comments() {
        let pts = parse_points_csv("x,y,z\n0,0,1\n\n# spot height\n 2.5 , 1.0 , -3\n").unwrap();
        assert_eq!(pts, vec![Point3::new(0.0, 0.0, 1.0), Point3::new(2.5, 1.0, -3.0)]);
    }

    #[test]
    fn header_after_leading_comment() {
        let pts = parse_points_csv("# site survey\n\nx,y,z\n1,2,3\n").unwrap();
        assert_eq!(pts, vec![Point3::new(1.0, 2.0, 3.0)]);
        // only the first data line may be a header
        let err = parse_points_csv("1,2,3\nx,y,z\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = parse_points_csv("0,0,1\n1,1\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("line 2"));
        let err = parse_points_csv("0,0,1\n1,abc,2\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn read_points_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        write_string(path, "x,y,z\n1,2,3.5\n-4,0.25,8\n").unwrap();
        let pts = vec![Point3::new(1.0, 2.0, 3.5), Point3::new(-4.0, 0.25, 8.0)];
        assert_eq!(read_points_csv(path).unwrap(), pts);
        assert!(read_surface(path).unwrap().triangles.is_empty());
    }

    #[test]
    fn curve_csv_format() {
        let curve = VolumeCurve {
            points: vec![CurvePoint {
                level: 1.0,
                result: VolumeResult::new(3.0, 0.5),
            }],
            skipped: Vec::new(),
        };
        assert_eq!(curve_to_csv(&curve), "level,cut,fill,net\n1.000,3.000,0.500,2.500\n");
    }
}
