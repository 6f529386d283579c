use alloc::sync::Arc;
use core::fmt;
use errno::Result;

macro_rules! format_field {
    (
        $(#[$meta:meta])*
        pub enum $ty:ident at $shift:literal {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum $ty {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $ty {
            const SHIFT: u32 = $shift;
            const MASK: u32 = 0xF << $shift;

            fn from_field(word: u32) -> Option<Self> {
                match (word & Self::MASK) >> Self::SHIFT {
                    $($value => Some($ty::$variant),)+
                    _ => None,
                }
            }

            const fn bits(self) -> u32 {
                (self as u32) << Self::SHIFT
            }
        }
    };
}

format_field! {
    /// The serial data format, bits 0..3.
    pub enum SerialFormat at 0 {
        I2s = 1,
        RightJ = 2,
        LeftJ = 3,
        DspA = 4,
        DspB = 5,
        Ac97 = 6,
        Pdm = 7,
    }
}

format_field! {
    /// Whether the bit clock runs between frames, bits 4..7.
    pub enum ClockGating at 4 {
        Gated = 0,
        Continuous = 1,
    }
}

format_field! {
    /// Bit clock and frame polarity, bits 8..11.
    pub enum ClockInversion at 8 {
        /// Normal bit clock, normal frame.
        NbNf = 1,
        NbIf = 2,
        IbNf = 3,
        IbIf = 4,
    }
}

format_field! {
    /// Which side provides bit clock and frame, bits 12..15.
    pub enum ClockProvider at 12 {
        /// The codec provides both.
        CbmCfm = 1,
        /// The codec provides the frame only.
        CbsCfm = 2,
        /// The codec provides the bit clock only.
        CbmCfs = 3,
        /// The codec consumes both.
        CbsCfs = 4,
    }
}

/// The ASoC DAI format word.
///
/// Four 4-bit fields, each holding one value of its enum. A zero field is
/// unset, except for [`ClockGating`] where zero means gated.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct DaiFormat(u32);

impl DaiFormat {
    pub const fn empty() -> Self {
        DaiFormat(0)
    }

    /// Wraps a raw format word, keeping only the four fields.
    pub const fn from_raw(raw: u32) -> Self {
        DaiFormat(raw & 0xFFFF)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn with_format(self, format: SerialFormat) -> Self {
        DaiFormat((self.0 & !SerialFormat::MASK) | format.bits())
    }

    pub const fn with_clock(self, clock: ClockGating) -> Self {
        DaiFormat((self.0 & !ClockGating::MASK) | clock.bits())
    }

    pub const fn with_inversion(self, inversion: ClockInversion) -> Self {
        DaiFormat((self.0 & !ClockInversion::MASK) | inversion.bits())
    }

    pub const fn with_provider(self, provider: ClockProvider) -> Self {
        DaiFormat((self.0 & !ClockProvider::MASK) | provider.bits())
    }

    pub fn format(self) -> Option<SerialFormat> {
        SerialFormat::from_field(self.0)
    }

    pub fn clock(self) -> Option<ClockGating> {
        ClockGating::from_field(self.0)
    }

    pub fn inversion(self) -> Option<ClockInversion> {
        ClockInversion::from_field(self.0)
    }

    pub fn provider(self) -> Option<ClockProvider> {
        ClockProvider::from_field(self.0)
    }
}

impl fmt::Debug for DaiFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DaiFormat")
            .field("format", &self.format())
            .field("clock", &self.clock())
            .field("inversion", &self.inversion())
            .field("provider", &self.provider())
            .finish()
    }
}

/// The stream parameters a codec-to-codec link runs at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PcmStream {
    /// Sample formats, one bit per `SNDRV_PCM_FORMAT_*`.
    pub formats: u64,
    pub rate_min: u32,
    pub rate_max: u32,
    pub channels_min: u32,
    pub channels_max: u32,
}

/// Stream callbacks for a DAI link. Every callback succeeds by default.
pub trait SocOps: Send + Sync {
    fn startup(&self, _link: &DaiLink) -> Result<()> {
        Ok(())
    }

    fn hw_params(&self, _link: &DaiLink, _params: &PcmStream) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self, _link: &DaiLink) {}
}

/// Called once when the sound card brings the link up.
pub type DaiInit = fn(&DaiLink) -> Result<()>;

/// One link between a CPU-side DAI and a codec DAI.
#[derive(Clone)]
pub struct DaiLink {
    pub name: &'static str,
    pub stream_name: &'static str,
    pub cpu_dai_name: &'static str,
    pub codec_dai_name: &'static str,
    pub codec_name: Option<&'static str>,
    pub platform_name: Option<&'static str>,
    pub dai_fmt: DaiFormat,
    /// Set for codec-to-codec links, which have no PCM device of their own.
    pub params: Option<PcmStream>,
    pub ops: Option<Arc<dyn SocOps>>,
    pub init: Option<DaiInit>,
    pub ignore_pmdown_time: bool,
}

impl DaiLink {
    /// A link named `name` whose stream and CPU DAI carry the same name.
    pub const fn new(name: &'static str) -> Self {
        DaiLink {
            name,
            stream_name: name,
            cpu_dai_name: name,
            codec_dai_name: "",
            codec_name: None,
            platform_name: None,
            dai_fmt: DaiFormat::empty(),
            params: None,
            ops: None,
            init: None,
            ignore_pmdown_time: true,
        }
    }
}

impl fmt::Debug for DaiLink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DaiLink")
            .field("name", &self.name)
            .field("stream_name", &self.stream_name)
            .field("cpu_dai_name", &self.cpu_dai_name)
            .field("codec_dai_name", &self.codec_dai_name)
            .field("dai_fmt", &self.dai_fmt)
            .field("params", &self.params)
            .field("has_ops", &self.ops.is_some())
            .field("has_init", &self.init.is_some())
            .finish()
    }
}

/// The name prefix that keeps one codec's controls apart from another's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecConf {
    pub dev_name: Option<&'static str>,
    pub name_prefix: &'static str,
}

impl CodecConf {
    pub const fn new(name_prefix: &'static str) -> Self {
        CodecConf { dev_name: None, name_prefix }
    }
}
