//! Heading control and the motion interface the patrol action drives.

use parking_lot::Mutex;
use std::sync::Arc;

/// Maximum roll command, degrees
const MAX_ROLL_DEG: f64 = 45.0;

/// One control command for the airframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlCommand {
    pub roll: f64,
    pub pitch: f64,
    pub throttle: f64,
    pub rudder: f64,
}

impl ControlCommand {
    /// Level cruise with the given roll
    pub fn cruise(roll: f64) -> Self {
        Self {
            roll,
            pitch: 0.0,
            throttle: 0.7,
            rudder: 0.0,
        }
    }
}

/// Physical model the trees send commands to; its output never feeds back
/// into allocation or tree logic
#[cfg_attr(test, mockall::automock)]
pub trait MotionController: Send {
    fn set_control(&mut self, command: ControlCommand);

    /// Advance the model one step
    fn update(&mut self);

    /// Return to the initial condition (after a refuel)
    fn reset(&mut self);

    fn close(&mut self);
}

/// Handle shared by every tree in a run
pub type SharedMotion = Arc<Mutex<dyn MotionController>>;

/// Stand-in airframe that records the last command and does nothing else
#[derive(Debug, Default)]
pub struct SimulatedAirframe {
    last_command: Option<ControlCommand>,
    steps: u64,
    closed: bool,
}

impl SimulatedAirframe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedMotion {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn last_command(&self) -> Option<ControlCommand> {
        self.last_command
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl MotionController for SimulatedAirframe {
    fn set_control(&mut self, command: ControlCommand) {
        self.last_command = Some(command);
    }

    fn update(&mut self) {
        self.steps += 1;
    }

    fn reset(&mut self) {
        self.last_command = None;
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// PID controller on course (yaw) error
#[derive(Debug, Clone)]
pub struct HeadingController {
    kp: f64,
    ki: f64,
    kd: f64,
    integral: f64,
    previous_error: f64,
}

impl Default for HeadingController {
    fn default() -> Self {
        Self::new(1.0, 0.00001, 0.01)
    }
}

impl HeadingController {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    /// Control signal (radians, clamped to ±45°) steering `current_deg`
    /// toward `reference_deg`
    pub fn calculate(&mut self, reference_deg: f64, current_deg: f64) -> f64 {
        let current = if current_deg < 0.0 {
            current_deg + 360.0
        } else {
            current_deg
        };

        let mut error = reference_deg - current;
        if error < -180.0 {
            error += 360.0;
        }
        if error > 180.0 {
            error -= 360.0;
        }
        let error = error.to_radians();

        let proportional = self.kp * error;
        self.integral += self.ki * error;
        let derivative = self.kd * (error - self.previous_error);
        self.previous_error = error;

        let limit = MAX_ROLL_DEG.to_radians();
        (proportional + self.integral + derivative).clamp(-limit, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_error_gives_zero_control() {
        let mut pid = HeadingController::default();
        assert_eq!(pid.calculate(90.0, 90.0), 0.0);
    }

    #[test]
    fn test_error_wraps_across_180() {
        let mut pid = HeadingController::new(1.0, 0.0, 0.0);
        // -170 and 190 are the same heading
        assert!(pid.calculate(-170.0, -170.0).abs() < 1e-12);
        // 170 -> -170 is a 20 degree turn, not 340
        let control = pid.calculate(-170.0, 170.0);
        assert!((control - 20f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_output_is_clamped() {
        let mut pid = HeadingController::default();
        let limit = 45f64.to_radians();
        assert!((pid.calculate(170.0, 0.0) - limit).abs() < 1e-12);
        assert!((pid.calculate(-170.0, 0.0) + limit).abs() < 1e-12);
    }

    #[test]
    fn test_simulated_airframe_records_commands() {
        let mut airframe = SimulatedAirframe::new();
        airframe.set_control(ControlCommand::cruise(0.1));
        airframe.update();
        assert_eq!(airframe.last_command(), Some(ControlCommand::cruise(0.1)));
        assert_eq!(airframe.steps(), 1);

        airframe.reset();
        assert!(airframe.last_command().is_none());
        airframe.close();
        assert!(airframe.is_closed());
    }
}
