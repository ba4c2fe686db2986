//! ReportBridge: samples an input source and sends encoded reports.

use crate::input::{InputError, InputSource};
use crate::output::{OutputError, ReportSink};
use crate::report::{build_report, ControllerState, FeatureConfig, ReportError, MAX_REPORT_LEN};

/// Forwards controller state from an input source to a report sink, encoded
/// with the layout of a fixed [`FeatureConfig`].
///
/// # Error Handling
///
/// On input errors, the bridge sends a neutral report to prevent stale
/// inputs from persisting.
pub struct ReportBridge<I, O> {
    input: I,
    output: O,
    config: FeatureConfig,
}

impl<I: InputSource, O: ReportSink> ReportBridge<I, O> {
    /// Create a new bridge from an input source, output sink and report
    /// configuration.
    pub fn new(input: I, output: O, config: FeatureConfig) -> Self {
        Self {
            input,
            output,
            config,
        }
    }

    /// Sample the input once and send the resulting report.
    pub async fn process_one(&mut self) -> Result<(), BridgeError> {
        let (state, input_error) = match self.input.sample() {
            Ok(state) => (state, None),
            Err(e) => (ControllerState::neutral(), Some(e)),
        };

        let mut report = [0u8; MAX_REPORT_LEN];
        let len = build_report(&mut report, &self.config, &state).map_err(BridgeError::Report)?;
        let sent = self.output.send(&report[..len]).await;

        if let Some(e) = input_error {
            return Err(BridgeError::Input(e));
        }
        sent.map_err(BridgeError::Output)
    }

    /// Get a reference to the output sink.
    pub fn output(&self) -> &O {
        &self.output
    }
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Error from the input source.
    Input(InputError),
    /// Error from the output sink.
    Output(OutputError),
    /// Report could not be encoded.
    Report(ReportError),
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::report::{Axis, AxisSet, Hat, SimulationSet};
    use crate::test_util::block_on;
    use core::future::Future;
    use std::sync::{Arc, Mutex};
    use std::vec;
    use std::vec::Vec;

    struct MockInput {
        states: Vec<Result<ControllerState, InputError>>,
        index: usize,
    }

    impl MockInput {
        fn new(states: Vec<Result<ControllerState, InputError>>) -> Self {
            Self { states, index: 0 }
        }
    }

    impl InputSource for MockInput {
        fn sample(&mut self) -> Result<ControllerState, InputError> {
            let result = self
                .states
                .get(self.index)
                .copied()
                .unwrap_or(Err(InputError::Disconnected));
            self.index += 1;
            result
        }

        fn is_connected(&self) -> bool {
            self.index < self.states.len()
        }
    }

    struct MockOutput {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        fail: bool,
    }

    impl MockOutput {
        fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }
    }

    impl ReportSink for MockOutput {
        fn send(&mut self, report: &[u8]) -> impl Future<Output = Result<(), OutputError>> {
            let result = if self.fail {
                Err(OutputError::NotReady)
            } else {
                self.sent.lock().unwrap().push(report.to_vec());
                Ok(())
            };
            core::future::ready(result)
        }

        fn is_ready(&self) -> bool {
            !self.fail
        }
    }

    const CONFIG: FeatureConfig = FeatureConfig {
        buttons: 8,
        hats: 1,
        axes: AxisSet::of(Axis::X),
        simulation: SimulationSet::NONE,
    };

    #[test]
    fn test_bridge_forwards_report() {
        let mut state = ControllerState::neutral();
        state.set_button(0, true);
        state.set_button(3, true);
        state.hats[0] = Hat::Right;
        state.set_axis(Axis::X, 0x1234);

        let output = MockOutput::new();
        let sent_ref = output.sent.clone();
        let mut bridge = ReportBridge::new(MockInput::new(vec![Ok(state)]), output, CONFIG);

        assert!(block_on(bridge.process_one()).is_ok());

        let sent = sent_ref.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], vec![0b0000_1001, Hat::Right.nibble() << 4, 0x34, 0x12]);
    }

    #[test]
    fn test_bridge_sends_neutral_on_error() {
        let output = MockOutput::new();
        let sent_ref = output.sent.clone();
        let mut bridge =
            ReportBridge::new(MockInput::new(vec![Err(InputError::Io)]), output, CONFIG);

        let result = block_on(bridge.process_one());
        assert_eq!(result, Err(BridgeError::Input(InputError::Io)));

        let sent = sent_ref.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], vec![0, Hat::Centered.nibble() << 4, 0, 0]);
    }

    #[test]
    fn test_bridge_reports_output_error() {
        let mut output = MockOutput::new();
        output.fail = true;
        let mut bridge = ReportBridge::new(
            MockInput::new(vec![Ok(ControllerState::neutral())]),
            output,
            CONFIG,
        );

        let result = block_on(bridge.process_one());
        assert_eq!(result, Err(BridgeError::Output(OutputError::NotReady)));
    }

    #[test]
    fn test_bridge_rejects_invalid_config() {
        let config = FeatureConfig {
            buttons: 65,
            ..CONFIG
        };
        let mut bridge = ReportBridge::new(
            MockInput::new(vec![Ok(ControllerState::neutral())]),
            MockOutput::new(),
            config,
        );

        let result = block_on(bridge.process_one());
        assert_eq!(result, Err(BridgeError::Report(ReportError::TooManyButtons)));
    }
}
