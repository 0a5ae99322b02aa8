use crate::foundation::error::{FxError, FxResult};

/// Rational frame rate, `num / den` frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> FxResult<Self> {
        if den == 0 {
            return Err(FxError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FxError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert a duration in seconds to a whole frame count, rounding to nearest.
    ///
    /// `what` names the parameter in the validation message.
    pub fn frames_for_secs(self, secs: f64, what: &str) -> FxResult<usize> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(FxError::validation(format!(
                "{what} must be finite and >= 0 (got {secs})"
            )));
        }
        Ok((secs * self.as_f64()).round() as usize)
    }

    /// Parse `"30"`, `"30/1"` or `"30000/1001"`.
    pub fn parse_ratio(s: &str) -> Option<Self> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim().parse().ok()?, d.trim().parse().ok()?),
            None => (s.parse().ok()?, 1),
        };
        Self::new(num, den).ok()
    }

    /// Integer fps when `den` divides `num`, which the mp4 encoder requires.
    pub fn as_integer(self) -> Option<u32> {
        if self.den != 0 && self.num.is_multiple_of(self.den) {
            Some(self.num / self.den)
        } else {
            None
        }
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn byte_len(self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_rejects_zero() {
        assert!(Fps::new(0, 1).is_err());
        assert!(Fps::new(30, 0).is_err());
    }

    #[test]
    fn frames_for_secs_rounds_to_nearest() {
        let fps = Fps::new(25, 1).unwrap();
        assert_eq!(fps.frames_for_secs(1.0, "x").unwrap(), 25);
        assert_eq!(fps.frames_for_secs(0.5, "x").unwrap(), 13);
        assert_eq!(fps.frames_for_secs(0.0, "x").unwrap(), 0);

        let ntsc = Fps::new(30000, 1001).unwrap();
        assert_eq!(ntsc.frames_for_secs(2.0, "x").unwrap(), 60);
    }

    #[test]
    fn frames_for_secs_rejects_negative_and_nan() {
        let fps = Fps::default();
        let err = fps.frames_for_secs(-1.0, "fade_in_sec").unwrap_err();
        assert!(err.to_string().contains("fade_in_sec"));
        assert!(fps.frames_for_secs(f64::NAN, "x").is_err());
    }

    #[test]
    fn parse_ratio_accepts_ffprobe_forms() {
        assert_eq!(Fps::parse_ratio("30/1"), Some(Fps { num: 30, den: 1 }));
        assert_eq!(Fps::parse_ratio(" 24 "), Some(Fps { num: 24, den: 1 }));
        assert_eq!(
            Fps::parse_ratio("30000/1001"),
            Some(Fps {
                num: 30000,
                den: 1001
            })
        );
        assert_eq!(Fps::parse_ratio("0/0"), None);
        assert_eq!(Fps::parse_ratio("abc"), None);
    }

    #[test]
    fn integer_fps_detection() {
        assert_eq!(Fps::new(60, 2).unwrap().as_integer(), Some(30));
        assert_eq!(Fps::new(30000, 1001).unwrap().as_integer(), None);
    }
}
