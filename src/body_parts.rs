// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Body part catalog for the OpenPose COCO layout.
//!
//! The network emits one heatmap channel per [`BodyPart`], in declaration
//! order. The final `Background` channel never takes part in the skeleton but
//! still occupies a slot in every [`PoseResult`](crate::PoseResult).

use std::fmt;
use std::str::FromStr;

use crate::error::PoseError;

/// A named body part with a fixed heatmap channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyPart {
    /// Nose (channel 0).
    Nose,
    /// Base of the neck (channel 1).
    Neck,
    /// Right shoulder (channel 2).
    RShoulder,
    /// Right elbow (channel 3).
    RElbow,
    /// Right wrist (channel 4).
    RWrist,
    /// Left shoulder (channel 5).
    LShoulder,
    /// Left elbow (channel 6).
    LElbow,
    /// Left wrist (channel 7).
    LWrist,
    /// Right hip (channel 8).
    RHip,
    /// Right knee (channel 9).
    RKnee,
    /// Right ankle (channel 10).
    RAnkle,
    /// Left hip (channel 11).
    LHip,
    /// Left knee (channel 12).
    LKnee,
    /// Left ankle (channel 13).
    LAnkle,
    /// Right eye (channel 14).
    REye,
    /// Left eye (channel 15).
    LEye,
    /// Right ear (channel 16).
    REar,
    /// Left ear (channel 17).
    LEar,
    /// Background sentinel (channel 18).
    Background,
}

impl BodyPart {
    /// Number of entries in the catalog, and so the heatmap channel count.
    pub const COUNT: usize = 19;

    /// Every body part in channel order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Nose,
        Self::Neck,
        Self::RShoulder,
        Self::RElbow,
        Self::RWrist,
        Self::LShoulder,
        Self::LElbow,
        Self::LWrist,
        Self::RHip,
        Self::RKnee,
        Self::RAnkle,
        Self::LHip,
        Self::LKnee,
        Self::LAnkle,
        Self::REye,
        Self::LEye,
        Self::REar,
        Self::LEar,
        Self::Background,
    ];

    /// Heatmap channel index of this part.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a part by its channel index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Canonical catalog name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nose => "Nose",
            Self::Neck => "Neck",
            Self::RShoulder => "RShoulder",
            Self::RElbow => "RElbow",
            Self::RWrist => "RWrist",
            Self::LShoulder => "LShoulder",
            Self::LElbow => "LElbow",
            Self::LWrist => "LWrist",
            Self::RHip => "RHip",
            Self::RKnee => "RKnee",
            Self::RAnkle => "RAnkle",
            Self::LHip => "LHip",
            Self::LKnee => "LKnee",
            Self::LAnkle => "LAnkle",
            Self::REye => "REye",
            Self::LEye => "LEye",
            Self::REar => "REar",
            Self::LEar => "LEar",
            Self::Background => "Background",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyPart {
    type Err = PoseError;

    /// Names are matched exactly against the catalog.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|part| part.name() == s)
            .ok_or_else(|| PoseError::UnknownBodyPart(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_declaration_order() {
        for (i, part) in BodyPart::ALL.iter().enumerate() {
            assert_eq!(part.index(), i);
            assert_eq!(BodyPart::from_index(i), Some(*part));
        }
        assert_eq!(BodyPart::Nose.index(), 0);
        assert_eq!(BodyPart::LAnkle.index(), 13);
        assert_eq!(BodyPart::Background.index(), 18);
        assert_eq!(BodyPart::from_index(19), None);
    }

    #[test]
    fn test_name_round_trip() {
        for part in BodyPart::ALL {
            assert_eq!(part.name().parse::<BodyPart>().unwrap(), part);
        }
        assert_eq!(BodyPart::RShoulder.to_string(), "RShoulder");
    }

    #[test]
    fn test_unknown_name() {
        let err = "Tail".parse::<BodyPart>().unwrap_err();
        assert!(matches!(err, PoseError::UnknownBodyPart(ref n) if n == "Tail"));

        // Lookup is case-sensitive
        assert!("nose".parse::<BodyPart>().is_err());
    }
}
