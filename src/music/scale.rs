use std::fmt;

const MAJOR: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];
const DIMINISHED: [i32; 7] = [0, 1, 3, 5, 6, 8, 10];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scale {
    #[default]
    Major,
    Minor,
    Diminished,
}

impl Scale {
    pub const ALL: [Scale; 3] = [Scale::Major, Scale::Minor, Scale::Diminished];

    // unknown names are not an error, they just play as major
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "minor" => Scale::Minor,
            "diminished" => Scale::Diminished,
            _ => Scale::Major,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Diminished => "diminished",
        }
    }

    pub fn intervals(self) -> &'static [i32] {
        match self {
            Scale::Major => &MAJOR,
            Scale::Minor => &MINOR,
            Scale::Diminished => &DIMINISHED,
        }
    }

    /// Semitone offset of a 1-indexed degree. Degrees past the table (or
    /// below 1) wrap around it instead of being rejected.
    pub fn semitone(self, degree: i32) -> i32 {
        let table = self.intervals();
        table[(degree - 1).rem_euclid(table.len() as i32) as usize]
    }

    /// Absolute pitch of a scale degree above `root`, or `None` for the rest
    /// degree 0.
    pub fn degree_to_pitch(self, root: i32, degree: i32, octave_shift: i32, accidental: i32) -> Option<i32> {
        if degree == 0 {
            return None;
        }
        // out-of-range shifts from data resolve to no pitch instead of wrapping
        root.checked_add(self.semitone(degree))?
            .checked_add(accidental)?
            .checked_add(octave_shift.checked_mul(12)?)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_degrees_from_c4() {
        let pitches: Vec<_> = (1..=8)
            .map(|d| Scale::Major.degree_to_pitch(60, d, 0, 0).unwrap())
            .collect();
        // degree 8 wraps back onto the root
        assert_eq!(pitches, vec![60, 62, 64, 65, 67, 69, 71, 60]);
    }

    #[test]
    fn rest_has_no_pitch() {
        for scale in Scale::ALL {
            assert_eq!(scale.degree_to_pitch(60, 0, 2, 1), None);
        }
    }

    #[test]
    fn octave_shift_and_accidental() {
        assert_eq!(Scale::Minor.degree_to_pitch(57, 3, 1, 0), Some(57 + 3 + 12));
        assert_eq!(Scale::Diminished.degree_to_pitch(60, 2, -1, 1), Some(60 + 1 + 1 - 12));
    }

    #[test]
    fn unknown_scale_is_major() {
        assert_eq!(Scale::from_name("lydian"), Scale::Major);
        assert_eq!(Scale::from_name(""), Scale::Major);
        for degree in -3..20 {
            assert_eq!(
                Scale::from_name("whatever").degree_to_pitch(48, degree, 0, 0),
                Scale::Major.degree_to_pitch(48, degree, 0, 0),
            );
        }
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Scale::from_name("Minor"), Scale::Minor);
        assert_eq!(Scale::from_name(" DIMINISHED "), Scale::Diminished);
    }

    #[test]
    fn overflowing_shifts_have_no_pitch() {
        assert_eq!(Scale::Major.degree_to_pitch(60, 1, i32::MAX, 0), None);
        assert_eq!(Scale::Major.degree_to_pitch(60, 1, i32::MIN, 0), None);
        assert_eq!(Scale::Minor.degree_to_pitch(60, 3, 0, i32::MAX), None);
        assert_eq!(Scale::Major.degree_to_pitch(i32::MAX, 2, 0, 0), None);
    }

    #[test]
    fn negative_degrees_wrap() {
        // -1 -> index (-2 mod 7) = 5
        assert_eq!(Scale::Major.semitone(-1), 9);
    }
}
