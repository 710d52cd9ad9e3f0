//! Relevance filter for CH setpoint frames
//!
//! Only one relationship is ever touched: the controller sending a
//! `1F09` to the OpenTherm bridge. All other traffic passes untouched.

use crate::codec::RamsesFrame;
use crate::error::BridgeError;
use std::fmt;
use std::str::FromStr;

/// Verb code of the CH setpoint message
pub const CH_SETPOINT_VERB: u16 = 0x1F09;

/// RAMSES II device address in `NN:NNNNNN` form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DeviceId {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 9
            && bytes[2] == b':'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 2 || b.is_ascii_digit());

        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(BridgeError::InvalidDeviceId {
                value: s.to_string(),
            })
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// True only for a controller -> OTB CH setpoint frame
pub fn is_relevant(frame: &RamsesFrame, controller_id: &DeviceId, otb_id: &DeviceId) -> bool {
    frame.verb == CH_SETPOINT_VERB
        && frame.src == controller_id.as_str()
        && frame.dst == otb_id.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use proptest::prelude::*;

    fn ids() -> (DeviceId, DeviceId) {
        ("01:033496".parse().unwrap(), "10:061315".parse().unwrap())
    }

    #[test]
    fn test_device_id_parse() {
        assert!("01:033496".parse::<DeviceId>().is_ok());
        assert!("1:033496".parse::<DeviceId>().is_err());
        assert!("01-033496".parse::<DeviceId>().is_err());
        assert!("01:03349a".parse::<DeviceId>().is_err());
        assert!("01:0334960".parse::<DeviceId>().is_err());
        assert!("--:------".parse::<DeviceId>().is_err());
        assert!("".parse::<DeviceId>().is_err());
    }

    #[test]
    fn test_relevant_controller_to_otb() {
        let (ctl, otb) = ids();
        let frame = decode(b"I --- 01:033496 10:061315 --:------ 1F09 003 5A 00 00\n").unwrap();
        assert!(is_relevant(&frame, &ctl, &otb));
    }

    #[test]
    fn test_not_relevant() {
        let (ctl, otb) = ids();
        let cases: [&[u8]; 4] = [
            // Wrong direction
            b"I --- 10:061315 01:033496 --:------ 1F09 003 5A 00 00\n",
            // Wrong verb
            b"I --- 01:033496 10:061315 --:------ 1F0A 003 5A 00 00\n",
            // Broadcast
            b"I --- 01:033496 --:------ 01:033496 1F09 003 5A 00 00\n",
            // Third party
            b"I --- 04:123456 10:061315 --:------ 1F09 003 5A 00 00\n",
        ];

        for line in cases {
            let frame = decode(line).unwrap();
            assert!(!is_relevant(&frame, &ctl, &otb), "{:?}", line);
        }
    }

    proptest! {
        #[test]
        fn prop_other_verbs_never_relevant(verb in any::<u16>()) {
            prop_assume!(verb != CH_SETPOINT_VERB);
            let (ctl, otb) = ids();
            let line = format!("I --- 01:033496 10:061315 --:------ {:04X} 001 5A\n", verb);
            let frame = decode(line.as_bytes()).unwrap();
            prop_assert!(!is_relevant(&frame, &ctl, &otb));
        }
    }
}
