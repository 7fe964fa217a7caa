// src/common/items.rs

//! Runtime commands, runtime queries and configuration items understood by
//! the controller. Names are used in diagnostics; mnemonics go on the wire.

use super::response::ResponseKind;

macro_rules! item_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($label:literal, $mnemonic:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every item, in manual order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            /// Diagnostic name, e.g. `_GO`.
            pub const fn name(self) -> &'static str {
                match self { $( $name::$variant => $label, )+ }
            }

            /// Mnemonic used on the wire, e.g. `G`.
            pub const fn mnemonic(self) -> &'static str {
                match self { $( $name::$variant => $mnemonic, )+ }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

item_table! {
    /// Runtime commands (`!<mnemonic> ...`).
    pub enum CommandItem {
        /// Set motor command.
        Go => ("_GO", "G"),
        /// Set motor command, both channels.
        MotorCommand => ("_MOTCMD", "M"),
        /// Go to absolute position.
        MotorPosition => ("_MOTPOS", "P"),
        /// Set motor speed.
        MotorVelocity => ("_MOTVEL", "S"),
        /// Set encoder counter.
        SetEncoderCounter => ("_SENCNTR", "C"),
        /// Set brushless counter.
        SetBrushlessCounter => ("_SBLCNTR", "CB"),
        /// Set user variable.
        Variable => ("_VAR", "VAR"),
        /// Set acceleration.
        Acceleration => ("_ACCEL", "AC"),
        /// Set deceleration.
        Deceleration => ("_DECEL", "DC"),
        /// Set all digital out bits.
        DigitalOut => ("_DOUT", "DS"),
        /// Set individual digital out bits.
        DigitalSet => ("_DSET", "D1"),
        /// Reset individual digital out bits.
        DigitalReset => ("_DRES", "D0"),
        /// Load home counter.
        Home => ("_HOME", "H"),
        /// Emergency stop.
        EmergencyStop => ("_ESTOP", "EX"),
        /// Release emergency stop.
        ReleaseStop => ("_MGO", "MG"),
    }
}

impl CommandItem {
    /// Whether the command carries a value after its optional channel index.
    pub const fn takes_value(self) -> bool {
        !matches!(self, CommandItem::Home | CommandItem::EmergencyStop | CommandItem::ReleaseStop)
    }
}

item_table! {
    /// Runtime queries (`?<mnemonic> [index]`).
    pub enum OperatingItem {
        /// Motor amps.
        MotorAmps => ("_MOTAMPS", "A"),
        /// Actual motor command.
        MotorCommand => ("_MOTCMD", "M"),
        /// Applied power level.
        MotorPower => ("_MOTPWR", "P"),
        /// Encoder motor speed in RPM.
        AbsoluteSpeed => ("_ABSPEED", "S"),
        /// Absolute encoder count.
        AbsoluteCounter => ("_ABCNTR", "C"),
        /// Absolute brushless counter.
        BrushlessCounter => ("_BLCNTR", "CB"),
        /// User variable.
        Variable => ("_VAR", "VAR"),
        /// Encoder motor speed as 1/1000 of max.
        RelativeSpeed => ("_RELSPEED", "SR"),
        /// Encoder count relative.
        RelativeCounter => ("_RELCNTR", "CR"),
        /// Brushless count relative.
        BrushlessRelativeCounter => ("_BLRCNTR", "CBR"),
        /// Brushless motor speed in RPM.
        BrushlessSpeed => ("_BLSPEED", "BS"),
        /// Brushless motor speed as 1/1000 of max.
        BrushlessRelativeSpeed => ("_BLRSPEED", "BSR"),
        /// Battery amps.
        BatteryAmps => ("_BATAMPS", "BA"),
        /// Internal voltages.
        Volts => ("_VOLTS", "V"),
        /// All digital inputs.
        DigitalInputs => ("_DIGIN", "D"),
        /// Individual digital inputs.
        DigitalInput => ("_DIN", "DI"),
        /// Analog inputs.
        AnalogInputs => ("_ANAIN", "AI"),
        /// Pulse inputs.
        PulseInputs => ("_PLSIN", "PI"),
        /// Case and internal temperatures.
        Temperature => ("_TEMP", "T"),
        /// Feedback.
        Feedback => ("_FEEDBK", "F"),
        /// Status flags.
        StatusFlags => ("_STFLAG", "FS"),
        /// Fault flags.
        FaultFlags => ("_FLTFLAG", "FF"),
        /// Current digital outputs.
        DigitalOutputs => ("_DIGOUT", "DO"),
        /// Closed loop error.
        LoopError => ("_LPERR", "E"),
        /// Internal serial command.
        SerialCommand => ("_CMDSER", "CIS"),
        /// Internal analog command.
        AnalogCommand => ("_CMDANA", "CIA"),
        /// Internal pulse command.
        PulseCommand => ("_CMDPLS", "CIP"),
        /// Time.
        Time => ("_TIME", "TM"),
        /// Lock status.
        Locked => ("_LOCKED", "LK"),
    }
}

impl OperatingItem {
    /// Kind of the line the controller answers this query with.
    pub const fn response_kind(self) -> ResponseKind {
        match self {
            OperatingItem::MotorAmps => ResponseKind::MotorAmps,
            OperatingItem::MotorCommand => ResponseKind::MotorCommandApplied,
            OperatingItem::MotorPower => ResponseKind::MotorPowerOutputApplied,
            OperatingItem::AbsoluteSpeed => ResponseKind::EncoderSpeedRpm,
            OperatingItem::AbsoluteCounter => ResponseKind::EncoderCountAbsolute,
            OperatingItem::BrushlessCounter => ResponseKind::BrushlessEncoderCountAbsolute,
            OperatingItem::Variable => ResponseKind::UserVariable,
            OperatingItem::RelativeSpeed => ResponseKind::EncoderSpeedRelative,
            OperatingItem::RelativeCounter => ResponseKind::EncoderCountRelative,
            OperatingItem::BrushlessRelativeCounter => ResponseKind::BrushlessEncoderCountRelative,
            OperatingItem::BrushlessSpeed => ResponseKind::BrushlessMotorSpeedRpm,
            OperatingItem::BrushlessRelativeSpeed => ResponseKind::BrushlessMotorSpeedPercent,
            OperatingItem::BatteryAmps => ResponseKind::BatteryAmps,
            OperatingItem::Volts => ResponseKind::Volts,
            OperatingItem::DigitalInputs => ResponseKind::DigitalInputs,
            OperatingItem::DigitalInput => ResponseKind::IndividualDigitalInputs,
            OperatingItem::AnalogInputs => ResponseKind::AnalogInput,
            OperatingItem::PulseInputs => ResponseKind::PulseInput,
            OperatingItem::Temperature => ResponseKind::Temperature,
            OperatingItem::Feedback => ResponseKind::FeedbackIn,
            OperatingItem::StatusFlags => ResponseKind::StatusFlag,
            OperatingItem::FaultFlags => ResponseKind::FaultFlag,
            OperatingItem::DigitalOutputs => ResponseKind::DigitalOutputStatus,
            OperatingItem::LoopError => ResponseKind::ClosedLoopError,
            OperatingItem::SerialCommand => ResponseKind::InternalSerial,
            OperatingItem::AnalogCommand => ResponseKind::InternalAnalog,
            OperatingItem::PulseCommand => ResponseKind::InternalPulse,
            OperatingItem::Time => ResponseKind::ReadTime,
            OperatingItem::Locked => ResponseKind::LockStatus,
        }
    }
}

item_table! {
    /// Configuration items (`^<mnemonic> ...` / `~<mnemonic> ...`).
    pub enum ConfigItem {
        Cad => ("_CAD", "CAD"),
        Ovl => ("_OVL", "OVL"),
        Uvl => ("_UVL", "UVL"),
        Thld => ("_THLD", "THLD"),
        Mxmd => ("_MXMD", "MXMD"),
        Pwmf => ("_PWMF", "PWMF"),
        Cpri => ("_CPRI", "CPRI"),
        /// RS232 watchdog (0 to disable).
        Rwd => ("_RWD", "RWD"),
        /// Disable/enable RS232 and USB echo.
        Echof => ("_ECHOF", "ECHOF"),
        /// Enable pulse min/max safety.
        Pms => ("_PMS", "PMS"),
        /// Enable analog center safety.
        Acs => ("_ACS", "ACS"),
        /// Enable analog min/max safety.
        Ams => ("_AMS", "AMS"),
        /// Command linearity.
        Clin => ("_CLIN", "CLIN"),
        /// Default command value.
        Dfc => ("_DFC", "DFC"),
        /// Digital input action.
        Dina => ("_DINA", "DINA"),
        /// Digital input active level.
        Dinl => ("_DINL", "DINL"),
        /// Digital output action.
        Doa => ("_DOA", "DOA"),
        /// Digital output active level.
        Dol => ("_DOL", "DOL"),
        /// Analog input mode.
        Amod => ("_AMOD", "AMOD"),
        /// Analog min.
        Amin => ("_AMIN", "AMIN"),
        /// Analog max.
        Amax => ("_AMAX", "AMAX"),
        /// Analog center.
        Actr => ("_ACTR", "ACTR"),
        /// Analog deadband.
        Adb => ("_ADB", "ADB"),
        /// Analog linearity.
        Alin => ("_ALIN", "ALIN"),
        /// Analog input actions.
        Aina => ("_AINA", "AINA"),
        /// Action on analog input min.
        Amina => ("_AMINA", "AMINA"),
        /// Action on analog input max.
        Amaxa => ("_AMAXA", "AMAXA"),
        /// Analog input polarity.
        Apol => ("_APOL", "APOL"),
        /// Pulse input mode.
        Pmod => ("_PMOD", "PMOD"),
        /// Pulse min.
        Pmin => ("_PMIN", "PMIN"),
        /// Pulse max.
        Pmax => ("_PMAX", "PMAX"),
        /// Pulse center.
        Pctr => ("_PCTR", "PCTR"),
        /// Pulse deadband.
        Pdb => ("_PDB", "PDB"),
        /// Pulse linearity.
        Plin => ("_PLIN", "PLIN"),
        /// Pulse input actions.
        Pina => ("_PINA", "PINA"),
        /// Action on pulse input min.
        Pmina => ("_PMINA", "PMINA"),
        /// Action on pulse input max.
        Pmaxa => ("_PMAXA", "PMAXA"),
        /// Pulse input polarity.
        Ppol => ("_PPOL", "PPOL"),
        /// Motor operating mode.
        Mmod => ("_MMOD", "MMOD"),
        /// Motor max power forward.
        Mxpf => ("_MXPF", "MXPF"),
        /// Motor max power reverse.
        Mxpr => ("_MXPR", "MXPR"),
        /// Motor amps limit.
        Alim => ("_ALIM", "ALIM"),
        /// Amps trigger value.
        Atrig => ("_ATRIG", "ATRIG"),
        /// Amps trigger action.
        Atga => ("_ATGA", "ATGA"),
        /// Amps trigger delay.
        Atgd => ("_ATGD", "ATGD"),
        /// PID proportional gain.
        Kp => ("_KP", "KP"),
        /// PID integral gain.
        Ki => ("_KI", "KI"),
        /// PID differential gain.
        Kd => ("_KD", "KD"),
        /// PID options.
        Pidm => ("_PIDM", "PIDM"),
        /// Motor integral cap.
        Icap => ("_ICAP", "ICAP"),
        /// Motor desired acceleration.
        Mac => ("_MAC", "MAC"),
        /// Motor desired deceleration.
        Mdec => ("_MDEC", "MDEC"),
        /// Motor default position velocity.
        Mvel => ("_MVEL", "MVEL"),
        /// Motor RPM at 100%.
        Mxrpm => ("_MXRPM", "MXRPM"),
        /// Number of motor turns between limits.
        Mxtrn => ("_MXTRN", "MXTRN"),
        /// Closed loop error detection.
        Clerd => ("_CLERD", "CLERD"),
        /// Number of poles of brushless motor.
        Bpol => ("_BPOL", "BPOL"),
        /// Brushless stall detection.
        Blstd => ("_BLSTD", "BLSTD"),
        /// Speed and position sensor feedback.
        Blfb => ("_BLFB", "BLFB"),
        /// Brushless counter load at home position.
        Bhome => ("_BHOME", "BHOME"),
        /// Brushless encoder low limit.
        Bll => ("_BLL", "BLL"),
        /// Brushless encoder high limit.
        Bhl => ("_BHL", "BHL"),
        /// Brushless encoder low limit action.
        Blla => ("_BLLA", "BLLA"),
        /// Brushless encoder high limit action.
        Bhla => ("_BHLA", "BHLA"),
        /// Sepex curve points.
        Sxc => ("_SXC", "SXC"),
        /// Minimum field current.
        Sxm => ("_SXM", "SXM"),
        /// Encoder operating mode.
        Emod => ("_EMOD", "EMOD"),
        /// Encoder PPR.
        Eppr => ("_EPPR", "EPPR"),
        /// Encoder low limit.
        Ell => ("_ELL", "ELL"),
        /// Encoder high limit.
        Ehl => ("_EHL", "EHL"),
        /// Encoder low limit action.
        Ella => ("_ELLA", "ELLA"),
        /// Encoder high limit action.
        Ehla => ("_EHLA", "EHLA"),
        /// KP curve points for motor 1.
        Kpc1 => ("_KPC1", "KPC1"),
        /// KP curve points for motor 2.
        Kpc2 => ("_KPC2", "KPC2"),
        /// KI curve points for motor 1.
        Kic1 => ("_KIC1", "KIC1"),
        /// KI curve points for motor 2.
        Kic2 => ("_KIC2", "KIC2"),
        /// KD curve points for motor 1.
        Kdc1 => ("_KDC1", "KDC1"),
        /// KD curve points for motor 2.
        Kdc2 => ("_KDC2", "KDC2"),
        /// Encoder counter load at home position.
        Ehome => ("_EHOME", "EHOME"),
    }
}
