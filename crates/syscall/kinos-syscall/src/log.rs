//! Log levels as user space names them in `log_string`.

/// Levels accepted by `log_string`. Anything else is `EPERM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum UserLogLevel {
    /// `kError`
    Error = 3,
    /// `kWarn`
    Warn = 4,
    /// `kInfo`
    Info = 6,
    /// `kDebug`
    Debug = 7,
}

impl UserLogLevel {
    /// Decodes the raw register value.
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match raw {
            3 => Some(Self::Error),
            4 => Some(Self::Warn),
            6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_four_codes_decode() {
        let accepted: Vec<u64> = (0..16).filter(|&raw| UserLogLevel::from_raw(raw).is_some()).collect();
        assert_eq!(accepted, [3, 4, 6, 7]);
    }

    #[test]
    fn decode_matches_discriminant() {
        for level in [UserLogLevel::Error, UserLogLevel::Warn, UserLogLevel::Info, UserLogLevel::Debug] {
            assert_eq!(UserLogLevel::from_raw(level as u64), Some(level));
        }
    }
}
