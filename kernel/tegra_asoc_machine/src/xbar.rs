//! Crossbar endpoint enums, in the order the hardware tables use.

use crate::{XbarCodecConf, XbarDaiLink, XbarIndex};
use static_assertions::const_assert_eq;

macro_rules! xbar_index {
    (
        $(#[$meta:meta])*
        pub enum $ty:ident: $kind:ident($soc:literal) {
            $($variant:ident => $name:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $ty {
            $($variant,)+
        }

        impl XbarIndex for $ty {
            const ALL: &'static [Self] = &[$($ty::$variant,)+];
            const COUNT: usize = Self::ALL.len();
            const SOC: &'static str = $soc;

            fn index(self) -> usize {
                self as usize
            }

            fn from_index(index: usize) -> Option<Self> {
                Self::ALL.get(index).copied()
            }

            fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl $kind for $ty {}

        impl core::fmt::Display for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

xbar_index! {
    /// Tegra124 crossbar client ports.
    pub enum Tegra124XbarDaiLink: XbarDaiLink("tegra124") {
        Apbif0 => "APBIF0",
        Apbif1 => "APBIF1",
        Apbif2 => "APBIF2",
        Apbif3 => "APBIF3",
        Apbif4 => "APBIF4",
        Apbif5 => "APBIF5",
        Apbif6 => "APBIF6",
        Apbif7 => "APBIF7",
        Apbif8 => "APBIF8",
        Apbif9 => "APBIF9",
        Amx0In0 => "AMX0_0",
        Amx0In1 => "AMX0_1",
        Amx0In2 => "AMX0_2",
        Amx0In3 => "AMX0_3",
        Amx0 => "AMX0",
        Amx1In0 => "AMX1_0",
        Amx1In1 => "AMX1_1",
        Amx1In2 => "AMX1_2",
        Amx1In3 => "AMX1_3",
        Amx1 => "AMX1",
        Adx0 => "ADX0",
        Adx0Out0 => "ADX0_0",
        Adx0Out1 => "ADX0_1",
        Adx0Out2 => "ADX0_2",
        Adx0Out3 => "ADX0_3",
        Adx1 => "ADX1",
        Adx1Out0 => "ADX1_0",
        Adx1Out1 => "ADX1_1",
        Adx1Out2 => "ADX1_2",
        Adx1Out3 => "ADX1_3",
        Dam0In0 => "DAM0_0",
        Dam0In1 => "DAM0_1",
        Dam0 => "DAM0",
        Dam1In0 => "DAM1_0",
        Dam1In1 => "DAM1_1",
        Dam1 => "DAM1",
        Dam2In0 => "DAM2_0",
        Dam2In1 => "DAM2_1",
        Dam2 => "DAM2",
        Afc0Rx => "AFC0_RX",
        Afc0Tx => "AFC0_TX",
        Afc1Rx => "AFC1_RX",
        Afc1Tx => "AFC1_TX",
        Afc2Rx => "AFC2_RX",
        Afc2Tx => "AFC2_TX",
        Afc3Rx => "AFC3_RX",
        Afc3Tx => "AFC3_TX",
        Afc4Rx => "AFC4_RX",
        Afc4Tx => "AFC4_TX",
        Afc5Rx => "AFC5_RX",
        Afc5Tx => "AFC5_TX",
    }
}

xbar_index! {
    /// Tegra210 crossbar client ports.
    pub enum Tegra210XbarDaiLink: XbarDaiLink("tegra210") {
        Admaif1 => "ADMAIF1",
        Admaif2 => "ADMAIF2",
        Admaif3 => "ADMAIF3",
        Admaif4 => "ADMAIF4",
        Admaif5 => "ADMAIF5",
        Admaif6 => "ADMAIF6",
        Admaif7 => "ADMAIF7",
        Admaif8 => "ADMAIF8",
        Admaif9 => "ADMAIF9",
        Admaif10 => "ADMAIF10",
        Amx1In1 => "AMX1_1",
        Amx1In2 => "AMX1_2",
        Amx1In3 => "AMX1_3",
        Amx1In4 => "AMX1_4",
        Amx1 => "AMX1",
        Amx2In1 => "AMX2_1",
        Amx2In2 => "AMX2_2",
        Amx2In3 => "AMX2_3",
        Amx2In4 => "AMX2_4",
        Amx2 => "AMX2",
        Adx1 => "ADX1",
        Adx1Out1 => "ADX1_1",
        Adx1Out2 => "ADX1_2",
        Adx1Out3 => "ADX1_3",
        Adx1Out4 => "ADX1_4",
        Adx2 => "ADX2",
        Adx2Out1 => "ADX2_1",
        Adx2Out2 => "ADX2_2",
        Adx2Out3 => "ADX2_3",
        Adx2Out4 => "ADX2_4",
        Mixer1Rx1 => "MIXER1_RX1",
        Mixer1Rx2 => "MIXER1_RX2",
        Mixer1Rx3 => "MIXER1_RX3",
        Mixer1Rx4 => "MIXER1_RX4",
        Mixer1Rx5 => "MIXER1_RX5",
        Mixer1Rx6 => "MIXER1_RX6",
        Mixer1Rx7 => "MIXER1_RX7",
        Mixer1Rx8 => "MIXER1_RX8",
        Mixer1Rx9 => "MIXER1_RX9",
        Mixer1Rx10 => "MIXER1_RX10",
        Mixer1Tx1 => "MIXER1_TX1",
        Mixer1Tx2 => "MIXER1_TX2",
        Mixer1Tx3 => "MIXER1_TX3",
        Mixer1Tx4 => "MIXER1_TX4",
        Mixer1Tx5 => "MIXER1_TX5",
        Sfc1Rx => "SFC1_RX",
        Sfc1Tx => "SFC1_TX",
        Sfc2Rx => "SFC2_RX",
        Sfc2Tx => "SFC2_TX",
        Sfc3Rx => "SFC3_RX",
        Sfc3Tx => "SFC3_TX",
        Sfc4Rx => "SFC4_RX",
        Sfc4Tx => "SFC4_TX",
        Mvc1Rx => "MVC1_RX",
        Mvc1Tx => "MVC1_TX",
        Mvc2Rx => "MVC2_RX",
        Mvc2Tx => "MVC2_TX",
        Afc1Rx => "AFC1_RX",
        Afc1Tx => "AFC1_TX",
        Afc2Rx => "AFC2_RX",
        Afc2Tx => "AFC2_TX",
        Afc3Rx => "AFC3_RX",
        Afc3Tx => "AFC3_TX",
        Afc4Rx => "AFC4_RX",
        Afc4Tx => "AFC4_TX",
        Afc5Rx => "AFC5_RX",
        Afc5Tx => "AFC5_TX",
        Afc6Rx => "AFC6_RX",
        Afc6Tx => "AFC6_TX",
    }
}

xbar_index! {
    /// Tegra124 crossbar modules.
    pub enum Tegra124XbarCodecConf: XbarCodecConf("tegra124") {
        Amx0 => "AMX0",
        Amx1 => "AMX1",
        Adx0 => "ADX0",
        Adx1 => "ADX1",
        Dam0 => "DAM0",
        Dam1 => "DAM1",
        Dam2 => "DAM2",
        Afc0 => "AFC0",
        Afc1 => "AFC1",
        Afc2 => "AFC2",
        Afc3 => "AFC3",
        Afc4 => "AFC4",
        Afc5 => "AFC5",
        I2s0 => "I2S0",
        I2s1 => "I2S1",
        I2s2 => "I2S2",
        I2s3 => "I2S3",
        I2s4 => "I2S4",
        Spdif => "SPDIF",
    }
}

xbar_index! {
    /// Tegra210 crossbar modules.
    pub enum Tegra210XbarCodecConf: XbarCodecConf("tegra210") {
        Amx1 => "AMX1",
        Amx2 => "AMX2",
        Adx1 => "ADX1",
        Adx2 => "ADX2",
        Sfc1 => "SFC1",
        Sfc2 => "SFC2",
        Sfc3 => "SFC3",
        Sfc4 => "SFC4",
        Mvc1 => "MVC1",
        Mvc2 => "MVC2",
        Afc1 => "AFC1",
        Afc2 => "AFC2",
        Afc3 => "AFC3",
        Afc4 => "AFC4",
        Afc5 => "AFC5",
        Afc6 => "AFC6",
        I2s1 => "I2S1",
        I2s2 => "I2S2",
        I2s3 => "I2S3",
        I2s4 => "I2S4",
        I2s5 => "I2S5",
        Spdif => "SPDIF",
    }
}

const_assert_eq!(<Tegra124XbarDaiLink as XbarIndex>::COUNT, 51);
const_assert_eq!(<Tegra210XbarDaiLink as XbarIndex>::COUNT, 69);
const_assert_eq!(<Tegra124XbarCodecConf as XbarIndex>::COUNT, 19);
const_assert_eq!(<Tegra210XbarCodecConf as XbarIndex>::COUNT, 22);
