use serde::{Deserialize, Serialize};

use crate::stops::parse_coordinate;
use crate::{normalize_id, Error, Result, ShapeID, Table, TableName};

/// Like stops, everything but the ID stays text until the shape is drawn.
#[derive(Clone, Debug, Deserialize)]
pub struct ShapePoint {
    pub shape_id: ShapeID,
    shape_pt_sequence: String,
    shape_pt_lat: String,
    shape_pt_lon: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

pub fn load(table: &Table) -> Result<Vec<ShapePoint>> {
    table.deserialize()
}

/// The points of one shape, ordered by shape_pt_sequence. Empty if the shape isn't defined.
pub fn polyline(points: &[ShapePoint], shape_id: &ShapeID) -> Result<Vec<LatLng>> {
    let mut matching = Vec::new();
    for pt in points.iter().filter(|pt| &pt.shape_id == shape_id) {
        matching.push((parse_sequence(pt)?, pt));
    }
    // Sort by shape_pt_sequence, in case the file isn't in order
    matching.sort_by_key(|(seq, _)| *seq);
    matching
        .into_iter()
        .map(|(seq, pt)| {
            let id = format!("{} #{seq}", pt.shape_id);
            Ok(LatLng {
                lat: parse_coordinate(TableName::Shapes, &id, &pt.shape_pt_lat)?,
                lng: parse_coordinate(TableName::Shapes, &id, &pt.shape_pt_lon)?,
            })
        })
        .collect()
}

// "2.0" is the same point as "2"
fn parse_sequence(pt: &ShapePoint) -> Result<u32> {
    normalize_id(&pt.shape_pt_sequence)
        .parse()
        .map_err(|_| Error::InvalidTable {
            table: TableName::Shapes,
            reason: format!(
                "bad shape_pt_sequence {:?} for {}",
                pt.shape_pt_sequence, pt.shape_id
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(contents: &str) -> Vec<ShapePoint> {
        load(&Table::from_reader(TableName::Shapes, contents.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn sorted_by_sequence_not_file_order() {
        let all = points(
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n\
             s1,3.0,30.0,30\n\
             s2,9.0,90.0,1\n\
             s1,1.0,10.0,2\n\
             s1,2.0,20.0,10\n",
        );
        let pl = polyline(&all, &ShapeID::new("s1")).unwrap();
        assert_eq!(
            pl,
            vec![
                LatLng { lat: 1.0, lng: 10.0 },
                LatLng { lat: 2.0, lng: 20.0 },
                LatLng { lat: 3.0, lng: 30.0 },
            ]
        );
        assert!(polyline(&all, &ShapeID::new("nope")).unwrap().is_empty());
    }

    #[test]
    fn bad_point() {
        let all = points("shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\ns1,x,1.0,1\n");
        assert!(matches!(
            polyline(&all, &ShapeID::new("s1")),
            Err(Error::MalformedCoordinate { .. })
        ));
    }

    #[test]
    fn sequences_written_as_floats() {
        let all = points(
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n\
             s1,2.0,20.0,10.0\n\
             s1,1.0,10.0,9\n\
             s2,9.0,90.0,oops\n",
        );
        assert_eq!(
            polyline(&all, &ShapeID::new("s1")).unwrap(),
            vec![LatLng { lat: 1.0, lng: 10.0 }, LatLng { lat: 2.0, lng: 20.0 }]
        );
        assert!(matches!(
            polyline(&all, &ShapeID::new("s2")),
            Err(Error::InvalidTable {
                table: TableName::Shapes,
                ..
            })
        ));
    }
}
