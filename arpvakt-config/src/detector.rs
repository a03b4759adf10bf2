//! Detector process configuration.
//!
//! The detector is an opaque external program; arpvakt only needs the
//! command line to launch it with.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Command line for the external detector process.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct DetectorConfig {
    /// Interpreter or executable that runs the detector.
    #[validate(custom(function = validation::validate_command))]
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments passed to the command, typically the detector script path.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_command() -> String {
    "python3".into()
}

fn default_args() -> Vec<String> {
    vec!["detectors/arp_spoof_detector.py".into()]
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
        }
    }
}
