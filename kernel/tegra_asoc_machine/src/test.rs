extern crate std;

use self::std::collections::HashSet;
use self::std::sync::atomic::{AtomicUsize, Ordering};
use alloc::sync::Arc;
use errno::{Errno, Result};

use crate::*;

fn assert_names_unique<I: XbarIndex>() {
    let names: HashSet<_> = I::ALL.iter().map(|i| i.name()).collect();
    assert_eq!(names.len(), I::COUNT, "{} has duplicate names", I::SOC);
    for (pos, i) in I::ALL.iter().enumerate() {
        assert_eq!(i.index(), pos);
        assert_eq!(I::from_index(pos), Some(*i));
    }
    assert_eq!(I::from_index(I::COUNT), None);
}

#[test]
fn tegra124_order() {
    assert_eq!(Tegra124XbarDaiLink::COUNT, 51);
    assert_eq!(Tegra124XbarDaiLink::Apbif9.index(), 9);
    assert_eq!(Tegra124XbarDaiLink::Amx0.index(), 14);
    // ADX lists the module before its outputs, AMX after its inputs.
    assert_eq!(Tegra124XbarDaiLink::Adx0.index(), 20);
    assert_eq!(Tegra124XbarDaiLink::Dam2.index(), 38);
    assert_eq!(Tegra124XbarDaiLink::Afc0Rx.index(), 39);
    assert_eq!(Tegra124XbarDaiLink::from_index(50), Some(Tegra124XbarDaiLink::Afc5Tx));

    assert_eq!(Tegra124XbarCodecConf::COUNT, 19);
    assert_eq!(Tegra124XbarCodecConf::Afc0.index(), 7);
    assert_eq!(Tegra124XbarCodecConf::I2s0.index(), 13);
    assert_eq!(Tegra124XbarCodecConf::Spdif.index(), 18);

    assert_names_unique::<Tegra124XbarDaiLink>();
    assert_names_unique::<Tegra124XbarCodecConf>();
}

#[test]
fn tegra210_order() {
    assert_eq!(Tegra210XbarDaiLink::COUNT, 69);
    assert_eq!(Tegra210XbarDaiLink::Admaif10.index(), 9);
    assert_eq!(Tegra210XbarDaiLink::Amx2.index(), 19);
    assert_eq!(Tegra210XbarDaiLink::Mixer1Rx1.index(), 30);
    assert_eq!(Tegra210XbarDaiLink::Mixer1Tx5.index(), 44);
    assert_eq!(Tegra210XbarDaiLink::Sfc1Rx.index(), 45);
    assert_eq!(Tegra210XbarDaiLink::Mvc1Rx.index(), 53);
    assert_eq!(Tegra210XbarDaiLink::Afc1Rx.index(), 57);
    assert_eq!(Tegra210XbarDaiLink::Afc6Tx.index(), 68);

    assert_eq!(Tegra210XbarCodecConf::COUNT, 22);
    assert_eq!(Tegra210XbarCodecConf::Mvc2.index(), 9);
    assert_eq!(Tegra210XbarCodecConf::I2s1.index(), 16);

    assert_names_unique::<Tegra210XbarDaiLink>();
    assert_names_unique::<Tegra210XbarCodecConf>();
    assert_eq!(alloc::format!("{}", Tegra210XbarDaiLink::Mixer1Rx10), "MIXER1_RX10");
}

#[test]
fn new_table_has_one_link_per_port() {
    let table = DaiLinkTable::<Tegra210XbarDaiLink>::new();
    assert_eq!(table.len(), 69);
    let link = table.get(Tegra210XbarDaiLink::Sfc3Tx).unwrap();
    assert_eq!((link.name, link.cpu_dai_name), ("SFC3_TX", "SFC3_TX"));
    assert!(link.ops.is_none() && link.params.is_none());

    let confs = CodecConfTable::<Tegra124XbarCodecConf>::new();
    assert_eq!(confs.len(), 19);
    assert_eq!(confs.get(Tegra124XbarCodecConf::Dam1).unwrap().name_prefix, "DAM1");
}

#[test]
fn append_returns_the_new_total() {
    let mut table = DaiLinkTable::<Tegra124XbarDaiLink>::new();
    assert_eq!(table.append(&[]), 51);
    assert_eq!(table.append(&[DaiLink::new("rt5639-playback"), DaiLink::new("rt5639-capture")]), 53);
    assert_eq!(table.links()[52].name, "rt5639-capture");

    table.get_mut_by_index(51).unwrap().codec_dai_name = "rt5639-aif1";
    assert_eq!(table.links()[51].codec_dai_name, "rt5639-aif1");
    assert_eq!(table.get_mut_by_index(53).map(|_| ()), Err(Errno::InvalidArgs));

    // Once removed, appended links are the whole table.
    table.remove();
    assert!(table.is_empty());
    assert_eq!(table.append(&[DaiLink::new("hdmi")]), 1);
}

struct CountingOps(AtomicUsize);

impl SocOps for CountingOps {
    fn hw_params(&self, _link: &DaiLink, params: &PcmStream) -> Result<()> {
        self.0.fetch_add(1, Ordering::Relaxed);
        if params.channels_max == 0 {
            return Err(Errno::InvalidArgs);
        }
        Ok(())
    }
}

fn init_i2s(link: &DaiLink) -> Result<()> {
    if link.dai_fmt.format() == Some(SerialFormat::I2s) { Ok(()) } else { Err(Errno::InvalidArgs) }
}

#[test]
fn setters_configure_one_link() {
    let mut table = DaiLinkTable::<Tegra210XbarDaiLink>::new();
    let ops = Arc::new(CountingOps(AtomicUsize::new(0)));
    let params = PcmStream {
        formats: 1 << 2,
        rate_min: 48_000,
        rate_max: 48_000,
        channels_min: 2,
        channels_max: 2,
    };
    let fmt = DaiFormat::empty()
        .with_format(SerialFormat::I2s)
        .with_inversion(ClockInversion::NbIf)
        .with_provider(ClockProvider::CbsCfs);

    table.set_ops(Tegra210XbarDaiLink::Admaif1, ops.clone()).unwrap();
    table.set_params(Tegra210XbarDaiLink::Admaif1, params).unwrap();
    table.set_fmt(Tegra210XbarDaiLink::Admaif1, fmt).unwrap();
    table.set_init(Tegra210XbarDaiLink::Admaif1, init_i2s).unwrap();

    let link = table.get(Tegra210XbarDaiLink::Admaif1).unwrap();
    assert_eq!(link.params, Some(params));
    assert_eq!(link.dai_fmt.provider(), Some(ClockProvider::CbsCfs));
    assert_eq!(link.init.map(|init| init(link)), Some(Ok(())));
    link.ops.as_ref().unwrap().hw_params(link, &params).unwrap();
    assert_eq!(ops.0.load(Ordering::Relaxed), 1);

    let other = table.get(Tegra210XbarDaiLink::Admaif2).unwrap();
    assert!(other.ops.is_none() && other.init.is_none());
    assert_eq!(other.dai_fmt, DaiFormat::empty());
}

#[test]
fn setters_fail_on_a_removed_table() {
    let mut table = DaiLinkTable::<Tegra124XbarDaiLink>::new();
    table.remove();
    assert_eq!(table.set_fmt(Tegra124XbarDaiLink::Apbif0, DaiFormat::empty().with_format(SerialFormat::DspA)), Err(Errno::InvalidArgs));
    assert_eq!(table.set_params(Tegra124XbarDaiLink::Afc5Tx, PcmStream::default()), Err(Errno::InvalidArgs));
    assert!(table.get(Tegra124XbarDaiLink::Apbif0).is_none());
}

#[test]
fn format_fields_are_independent() {
    let fmt = DaiFormat::empty()
        .with_format(SerialFormat::DspB)
        .with_clock(ClockGating::Continuous)
        .with_inversion(ClockInversion::IbIf)
        .with_provider(ClockProvider::CbmCfs);
    assert_eq!(fmt.raw(), 0x3415);
    assert_eq!(fmt.format(), Some(SerialFormat::DspB));
    assert_eq!(fmt.clock(), Some(ClockGating::Continuous));
    assert_eq!(fmt.inversion(), Some(ClockInversion::IbIf));
    assert_eq!(fmt.provider(), Some(ClockProvider::CbmCfs));

    // Replacing a field leaves the others alone.
    let fmt = fmt.with_format(SerialFormat::I2s).with_clock(ClockGating::Gated);
    assert_eq!(fmt.raw(), 0x3401);
    assert_eq!(fmt.provider(), Some(ClockProvider::CbmCfs));
}

#[test]
fn format_values_are_not_bit_sets() {
    // LEFT_J shares bits with I2S and RIGHT_J but is neither.
    let left_j = DaiFormat::empty().with_format(SerialFormat::LeftJ);
    assert_eq!(left_j.raw(), 3);
    assert_eq!(left_j.format(), Some(SerialFormat::LeftJ));
    assert_eq!(left_j.inversion(), None);
    assert_eq!(
        alloc::format!("{:?}", left_j),
        "DaiFormat { format: Some(LeftJ), clock: Some(Gated), inversion: None, provider: None }"
    );

    let raw = DaiFormat::from_raw(0x1_0F09);
    assert_eq!(raw.raw(), 0x0F09);
    assert_eq!(raw.format(), None);
    assert_eq!(raw.inversion(), None);
}

#[test]
fn codec_confs_append_and_remove() {
    let mut confs = CodecConfTable::<Tegra210XbarCodecConf>::new();
    let board = CodecConf { dev_name: Some("rt5659.0-001a"), name_prefix: "CVB-RT" };
    assert_eq!(confs.append(&[board]), 23);
    assert_eq!(confs.confs()[22], board);
    confs.remove();
    assert_eq!(confs.get(Tegra210XbarCodecConf::Amx1), None);
    assert_eq!(confs.append(&[board]), 1);
}
