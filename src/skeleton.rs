// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Skeleton topology and edge assembly.

use crate::body_parts::BodyPart;
use crate::error::Result;
use crate::results::PoseResult;

/// OpenPose COCO limb pairs in rendering order.
/// Later pairs are drawn over earlier ones.
pub const POSE_PAIRS: [(BodyPart, BodyPart); 17] = [
    (BodyPart::Neck, BodyPart::RShoulder),
    (BodyPart::Neck, BodyPart::LShoulder),
    (BodyPart::RShoulder, BodyPart::RElbow),
    (BodyPart::RElbow, BodyPart::RWrist),
    (BodyPart::LShoulder, BodyPart::LElbow),
    (BodyPart::LElbow, BodyPart::LWrist),
    (BodyPart::Neck, BodyPart::RHip),
    (BodyPart::RHip, BodyPart::RKnee),
    (BodyPart::RKnee, BodyPart::RAnkle),
    (BodyPart::Neck, BodyPart::LHip),
    (BodyPart::LHip, BodyPart::LKnee),
    (BodyPart::LKnee, BodyPart::LAnkle),
    (BodyPart::Neck, BodyPart::Nose),
    (BodyPart::Nose, BodyPart::REye),
    (BodyPart::REye, BodyPart::REar),
    (BodyPart::Nose, BodyPart::LEye),
    (BodyPart::LEye, BodyPart::LEar),
];

/// The same pairs by catalog name, for configurations expressed as text.
pub const POSE_PAIR_NAMES: [[&str; 2]; 17] = [
    ["Neck", "RShoulder"],
    ["Neck", "LShoulder"],
    ["RShoulder", "RElbow"],
    ["RElbow", "RWrist"],
    ["LShoulder", "LElbow"],
    ["LElbow", "LWrist"],
    ["Neck", "RHip"],
    ["RHip", "RKnee"],
    ["RKnee", "RAnkle"],
    ["Neck", "LHip"],
    ["LHip", "LKnee"],
    ["LKnee", "LAnkle"],
    ["Neck", "Nose"],
    ["Nose", "REye"],
    ["REye", "REar"],
    ["Nose", "LEye"],
    ["LEye", "LEar"],
];

/// A drawable limb between two present keypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Part at the start of the limb.
    pub from: BodyPart,
    /// Part at the end of the limb.
    pub to: BodyPart,
    /// Start position in image pixels `(x, y)`.
    pub start: (i32, i32),
    /// End position in image pixels `(x, y)`.
    pub end: (i32, i32),
}

/// Ordered set of part pairs that may be joined by a limb.
///
/// Every pair is resolved against the body part catalog at construction, so
/// assembling edges from a `Topology` cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pairs: Vec<(BodyPart, BodyPart)>,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            pairs: POSE_PAIRS.to_vec(),
        }
    }
}

impl Topology {
    /// The OpenPose COCO topology.
    #[must_use]
    pub fn openpose() -> Self {
        Self::default()
    }

    /// Build a topology from typed pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(BodyPart, BodyPart)]) -> Self {
        Self {
            pairs: pairs.to_vec(),
        }
    }

    /// Build a topology from catalog names.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::UnknownBodyPart`](crate::PoseError::UnknownBodyPart)
    /// for the first name that is not in the catalog.
    pub fn from_names<S: AsRef<str>>(pairs: &[[S; 2]]) -> Result<Self> {
        let pairs = pairs
            .iter()
            .map(|[from, to]| -> Result<(BodyPart, BodyPart)> {
                Ok((from.as_ref().parse()?, to.as_ref().parse()?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { pairs })
    }

    /// Pairs in rendering order.
    #[must_use]
    pub fn pairs(&self) -> &[(BodyPart, BodyPart)] {
        &self.pairs
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the topology has no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Whether any pair touches `part`.
    #[must_use]
    pub fn touches(&self, part: BodyPart) -> bool {
        self.pairs.iter().any(|&(a, b)| a == part || b == part)
    }

    /// Assemble the limbs whose endpoints are both present, in topology order.
    #[must_use]
    pub fn edges(&self, pose: &PoseResult) -> Vec<Edge> {
        self.pairs
            .iter()
            .filter_map(|&(from, to)| {
                let start = pose[from].position()?;
                let end = pose[to].position()?;
                Some(Edge {
                    from,
                    to,
                    start,
                    end,
                })
            })
            .collect()
    }
}

/// Assemble edges for `pose` using the OpenPose COCO topology.
#[must_use]
pub fn assemble_edges(pose: &PoseResult) -> Vec<Edge> {
    Topology::openpose().edges(pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoseError;
    use crate::results::Keypoint;

    fn full_pose() -> PoseResult {
        let mut pose = PoseResult::empty();
        for part in BodyPart::ALL {
            let i = i32::try_from(part.index()).unwrap();
            pose.set(
                part,
                Keypoint::Present {
                    x: i * 10,
                    y: i * 20,
                    confidence: 0.9,
                },
            );
        }
        pose
    }

    #[test]
    fn test_name_table_matches_typed_table() {
        let by_name = Topology::from_names(&POSE_PAIR_NAMES).unwrap();
        assert_eq!(by_name, Topology::openpose());
        assert_eq!(by_name.len(), 17);
    }

    #[test]
    fn test_unknown_name_fails() {
        let err = Topology::from_names(&[["Neck", "RShoulder"], ["Neck", "Tail"]]).unwrap_err();
        assert!(matches!(err, PoseError::UnknownBodyPart(ref n) if n == "Tail"));
    }

    #[test]
    fn test_background_not_in_topology() {
        assert!(!Topology::openpose().touches(BodyPart::Background));
        assert!(Topology::openpose().touches(BodyPart::Nose));
    }

    #[test]
    fn test_all_present_yields_every_edge_in_order() {
        let pose = full_pose();
        let edges = assemble_edges(&pose);
        assert_eq!(edges.len(), POSE_PAIRS.len());
        for (edge, &(from, to)) in edges.iter().zip(POSE_PAIRS.iter()) {
            assert_eq!((edge.from, edge.to), (from, to));
            assert_eq!(Some(edge.start), pose[from].position());
            assert_eq!(Some(edge.end), pose[to].position());
        }
    }

    #[test]
    fn test_absent_part_removes_only_its_pairs() {
        let topology = Topology::openpose();
        for missing in BodyPart::ALL {
            let mut pose = full_pose();
            pose.set(missing, Keypoint::Absent);

            let edges = topology.edges(&pose);
            let expected: Vec<(BodyPart, BodyPart)> = POSE_PAIRS
                .iter()
                .copied()
                .filter(|&(a, b)| a != missing && b != missing)
                .collect();
            let actual: Vec<(BodyPart, BodyPart)> =
                edges.iter().map(|e| (e.from, e.to)).collect();
            assert_eq!(actual, expected, "missing {missing}");
        }
    }

    #[test]
    fn test_empty_pose_has_no_edges() {
        assert!(assemble_edges(&PoseResult::empty()).is_empty());
    }

    #[test]
    fn test_custom_topology_order_preserved() {
        let topology = Topology::from_pairs(&[
            (BodyPart::LEye, BodyPart::LEar),
            (BodyPart::Neck, BodyPart::RShoulder),
        ]);
        let edges = topology.edges(&full_pose());
        assert_eq!(edges[0].from, BodyPart::LEye);
        assert_eq!(edges[1].from, BodyPart::Neck);
    }
}
