// src/controller/sync_controller/protocol_helpers.rs

use super::SyncController;
use crate::common::{
    command::ControllerCommand,
    error::ControllerError,
    fault_flags::FaultFlags,
    frame::{CHANNEL_DELIMITER, KEY_DELIMITER},
    hal_traits::ControllerSerial,
    items::{CommandItem, ConfigItem, OperatingItem},
    response::{decode_generic, decode_values, Channels, DecodedReading, DecodingError},
};

/// Splits a model line (`TRN=RCB500:MDC2250`) into control unit type and
/// controller model.
///
/// The control unit is the text between `<key>=` and the next `:`, the
/// model is everything after that `:`.
pub(super) fn parse_model_line<'a>(line: &'a str, key: &str) -> Option<(&'a str, &'a str)> {
    let start = line.find(key)? + key.len();
    let rest = line[start..].strip_prefix(KEY_DELIMITER)?;
    rest.split_once(CHANNEL_DELIMITER)
}

impl<IF> SyncController<IF>
where
    IF: ControllerSerial,
{
    /// Sends a runtime command (`!G 1 500`). An `index` of 0 is omitted.
    ///
    /// A nak becomes [`ControllerError::Rejected`], silence becomes
    /// [`ControllerError::NoResponse`].
    pub fn set_command(
        &mut self,
        item: CommandItem,
        value: i32,
        index: u8,
    ) -> Result<(), ControllerError<IF::Error>> {
        let command = ControllerCommand::Action { item, index, value };
        let subject = format!("{} at index {} to {}", item.name(), index, value);
        self.send_command(&command)?.into_result::<IF::Error>(&subject)?;
        Ok(())
    }

    /// Queries a runtime value (`?A 1`) and decodes every channel of the
    /// answer.
    pub fn get_value(
        &mut self,
        item: OperatingItem,
        index: u8,
    ) -> Result<DecodedReading, ControllerError<IF::Error>> {
        let command = ControllerCommand::Query { item, index };
        let line = self.read_line(&command, &format!("{} at index {}", item.name(), index))?;

        let reading = decode_generic(&line)?;
        let expected = item.response_kind();
        if reading.kind() != expected {
            return Err(DecodingError::KindMismatch { expected, found: reading.kind() }.into());
        }
        Ok(reading)
    }

    /// Writes a configuration item (`^ALIM 1 450`).
    pub fn set_config(
        &mut self,
        item: ConfigItem,
        value: i32,
        index: u8,
    ) -> Result<(), ControllerError<IF::Error>> {
        let command = ControllerCommand::SetConfig { item, index, value };
        let subject = format!("{} at index {} to {}", item.name(), index, value);
        self.send_command(&command)?.into_result::<IF::Error>(&subject)?;
        Ok(())
    }

    /// Reads a configuration item (`~MMOD 1`).
    ///
    /// Configuration keys are not classified; the values after the key are
    /// parsed leniently.
    pub fn get_config(
        &mut self,
        item: ConfigItem,
        index: u8,
    ) -> Result<Channels, ControllerError<IF::Error>> {
        let command = ControllerCommand::GetConfig { item, index };
        let line = self.read_line(&command, &format!("{} at index {}", item.name(), index))?;
        Ok(decode_values(&line)?)
    }

    /// Reads and decodes the fault flags (`?FF`).
    pub fn fault_flags(&mut self) -> Result<FaultFlags, ControllerError<IF::Error>> {
        let reading = self.get_value(OperatingItem::FaultFlags, 0)?;
        Ok(FaultFlags::from_reading(reading.channel(1).unwrap_or_default()))
    }

    fn read_line(
        &mut self,
        command: &ControllerCommand<'_>,
        subject: &str,
    ) -> Result<String, ControllerError<IF::Error>> {
        match self.send_keyed_query(command)?.into_result::<IF::Error>(subject)? {
            Some(line) => Ok(line),
            None => Err(ControllerError::NoResponse(subject.to_string())),
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::super::test_support::{connected, Reply};
    use super::*;
    use crate::common::response::ResponseKind;

    #[test]
    fn test_parse_model_line() {
        assert_eq!(parse_model_line("TRN=RCB500:MDC2250", "TRN"), Some(("RCB500", "MDC2250")));
        assert_eq!(parse_model_line("TRN=:MDC2250", "TRN"), Some(("", "MDC2250")));
        assert_eq!(
            parse_model_line("TRN=RCB500:MDC2250:v2", "TRN"),
            Some(("RCB500", "MDC2250:v2"))
        );
        assert_eq!(parse_model_line("TRN=RCB500", "TRN"), None);
        assert_eq!(parse_model_line("RCB500:MDC2250", "TRN"), None);
        assert_eq!(parse_model_line("", "TRN"), None);
    }

    #[test]
    fn test_set_command() {
        let mut controller = connected();
        controller.set_command(CommandItem::Go, 500, 1).unwrap();
        controller.set_command(CommandItem::EmergencyStop, 0, 0).unwrap();
        let frames = controller.interface.frames();
        assert_eq!(&frames[frames.len() - 2..], ["!G 1 500", "!EX"]);
    }

    #[test]
    fn test_set_command_rejected() {
        let mut controller = connected();
        controller.interface.reply = Reply::Nak;
        match controller.set_command(CommandItem::Go, 5000, 3) {
            Err(ControllerError::Rejected(reason)) => {
                assert_eq!(reason, "_GO at index 3 to 5000: negative acknowledgement for !G 3 5000")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_set_config_unanswered() {
        let mut controller = connected();
        controller.interface.reply = Reply::Silent;
        match controller.set_config(ConfigItem::Alim, 450, 1) {
            Err(ControllerError::NoResponse(reason)) => {
                assert_eq!(reason, "_ALIM at index 1 to 450: no acknowledgement for ^ALIM 1 450")
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(controller.interface.frames().last().map(String::as_str), Some("^ALIM 1 450"));
    }

    #[test]
    fn test_get_value() {
        let mut controller = connected();

        let reading = controller.get_value(OperatingItem::MotorAmps, 0).unwrap();
        assert_eq!(reading.kind(), ResponseKind::MotorAmps);
        assert_eq!(reading.channels(), &[120, -35]);

        let reading = controller.get_value(OperatingItem::MotorAmps, 1).unwrap();
        assert_eq!(reading.channels(), &[120]);

        let reading = controller.get_value(OperatingItem::Volts, 0).unwrap();
        assert_eq!(reading.kind(), ResponseKind::Volts);
        assert_eq!(reading.channel(3), Some(50));
    }

    #[test]
    fn test_get_value_too_many_channels() {
        let mut controller = connected();
        let values: Vec<String> = (0..17).map(|v| v.to_string()).collect();
        controller
            .interface
            .answers
            .insert("?AI".to_string(), format!("AI={}", values.join(":")));
        let result = controller.get_value(OperatingItem::AnalogInputs, 0);
        assert!(matches!(
            result,
            Err(ControllerError::Decoding(DecodingError::TooManyChannels { max: 16 }))
        ));
    }

    #[test]
    fn test_get_value_unanswered() {
        let mut controller = connected();
        match controller.get_value(OperatingItem::Temperature, 1) {
            Err(ControllerError::NoResponse(reason)) => {
                assert_eq!(reason, "_TEMP at index 1: no query response for ?T 1")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_errors_tell_same_item_requests_apart() {
        let mut controller = connected();
        controller.interface.reply = Reply::Nak;
        let first = controller.set_command(CommandItem::Go, 100, 1).unwrap_err();
        let second = controller.set_command(CommandItem::Go, -100, 2).unwrap_err();
        assert_ne!(first.to_string(), second.to_string());
        assert!(second.to_string().contains("_GO at index 2 to -100"), "{}", second);
    }

    #[test]
    fn test_get_config() {
        let mut controller = connected();
        assert_eq!(controller.get_config(ConfigItem::Mmod, 1).unwrap().as_slice(), &[3]);
        assert_eq!(controller.get_config(ConfigItem::Alim, 0).unwrap().as_slice(), &[450, 300]);
    }

    #[test]
    fn test_fault_flags() {
        let mut controller = connected();
        let flags = controller.fault_flags().unwrap();
        assert_eq!(flags, FaultFlags::OVERHEAT | FaultFlags::OVERVOLTAGE);
    }
}
