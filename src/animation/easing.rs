//! Easing curves in the `powerN.in|out|inOut` family.
//!
//! `power1` is quadratic, `power2` cubic, `power3` quartic and `power4`
//! quintic. Names parse from the usual string form (`"power2.out"`,
//! `"power3.inOut"`, `"none"`).

use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    InOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ease {
    Linear,
    Power(u8, Direction),
}

impl Ease {
    pub const POWER1_OUT: Ease = Ease::Power(1, Direction::Out);
    pub const POWER2_IN: Ease = Ease::Power(2, Direction::In);
    pub const POWER2_OUT: Ease = Ease::Power(2, Direction::Out);
    pub const POWER2_IN_OUT: Ease = Ease::Power(2, Direction::InOut);
    pub const POWER3_OUT: Ease = Ease::Power(3, Direction::Out);
    pub const POWER3_IN_OUT: Ease = Ease::Power(3, Direction::InOut);

    /// Maps linear progress in `[0, 1]` to eased progress. Input outside the
    /// range is clamped, and both ends are exact.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Ease::Linear => t,
            Ease::Power(power, direction) => {
                let exponent = power as i32 + 1;
                match direction {
                    Direction::In => t.powi(exponent),
                    Direction::Out => 1.0 - (1.0 - t).powi(exponent),
                    Direction::InOut => {
                        if t < 0.5 {
                            (2.0 * t).powi(exponent) / 2.0
                        } else {
                            1.0 - (2.0 * (1.0 - t)).powi(exponent) / 2.0
                        }
                    }
                }
            }
        }
    }
}

impl Default for Ease {
    /// `power1.out`, the default of most tween libraries.
    fn default() -> Self {
        Ease::POWER1_OUT
    }
}

impl FromStr for Ease {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "none" || s == "linear" {
            return Ok(Ease::Linear);
        }
        let (name, direction) = s.split_once('.').unwrap_or((s, "out"));
        let direction = match direction {
            "in" => Direction::In,
            "out" => Direction::Out,
            "inOut" => Direction::InOut,
            other => anyhow::bail!("unknown ease direction '{}' in '{}'", other, s),
        };
        let power = match name {
            "power1" | "quad" => 1,
            "power2" | "cubic" => 2,
            "power3" | "quart" => 3,
            "power4" | "quint" | "strong" => 4,
            "power0" => return Ok(Ease::Linear),
            other => anyhow::bail!("unknown ease '{}'", other),
        };
        Ok(Ease::Power(power, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names() {
        assert_eq!("power2.out".parse::<Ease>().unwrap(), Ease::POWER2_OUT);
        assert_eq!("power3.inOut".parse::<Ease>().unwrap(), Ease::POWER3_IN_OUT);
        assert_eq!("none".parse::<Ease>().unwrap(), Ease::Linear);
        assert!("bounce.out".parse::<Ease>().is_err());
    }

    #[test]
    fn endpoints_are_exact() {
        for ease in [Ease::POWER2_IN, Ease::POWER2_OUT, Ease::POWER3_IN_OUT] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
        }
        assert!((Ease::POWER2_IN_OUT.apply(0.5) - 0.5).abs() < 1e-6);
    }
}
