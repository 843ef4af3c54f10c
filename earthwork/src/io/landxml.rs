use std::io;

use roxmltree::Document;

use crate::dtm::Tin;
use crate::geometry::Point3;

use super::read_to_string;

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Parses the first `<Surface>` of a LandXML document into a [`Tin`].
///
/// Point ids in `<F>` face records are matched against the `id` attribute of
/// `<P>` records; points without an id are numbered from 1 in file order.
pub fn parse_landxml_surface(xml: &str) -> io::Result<Tin> {
    let doc = Document::parse(xml).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut vertices = Vec::new();
    let mut ids = std::collections::HashMap::new();
    if let Some(pnts) = doc.descendants().find(|n| n.has_tag_name("Pnts")) {
        for p in pnts.children().filter(|c| c.has_tag_name("P")) {
            let text = p.text().unwrap_or_default();
            let nums: Vec<f64> = text
                .split_whitespace()
                .map(|s| s.parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|e| invalid(format!("point `{}`: {e}", text.trim())))?;
            if nums.len() < 3 {
                return Err(invalid(format!("point `{}`: expected three values", text.trim())));
            }
            let id = match p.attribute("id") {
                Some(id) => id
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| invalid(format!("point id `{id}`: {e}")))?,
                None => vertices.len() + 1,
            };
            ids.insert(id, vertices.len());
            // LandXML stores northing before easting
            vertices.push(Point3::new(nums[1], nums[0], nums[2]));
        }
    }
    let mut triangles = Vec::new();
    if let Some(faces) = doc.descendants().find(|n| n.has_tag_name("Faces")) {
        for f in faces.children().filter(|c| c.has_tag_name("F")) {
            // invisible faces lie outside the surface boundary
            if f.attribute("i") == Some("1") {
                continue;
            }
            let text = f.text().unwrap_or_default();
            let refs: Vec<usize> = text
                .split_whitespace()
                .map(|s| s.parse::<usize>())
                .collect::<Result<_, _>>()
                .map_err(|e| invalid(format!("face `{}`: {e}", text.trim())))?;
            if refs.len() < 3 {
                return Err(invalid(format!("face `{}`: expected three point ids", text.trim())));
            }
            let mut tri = [0usize; 3];
            for (slot, id) in tri.iter_mut().zip(&refs) {
                *slot = *ids
                    .get(id)
                    .ok_or_else(|| invalid(format!("face references unknown point {id}")))?;
            }
            triangles.push(tri);
        }
    }
    Ok(Tin {
        vertices,
        triangles,
    })
}

/// Reads a LandXML file containing a surface and returns it as a [`Tin`].
pub fn read_landxml_surface(path: &str) -> io::Result<Tin> {
    parse_landxml_surface(&read_to_string(path)?)
}
