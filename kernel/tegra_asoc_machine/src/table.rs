use crate::{CodecConf, DaiFormat, DaiInit, DaiLink, PcmStream, SocOps, XbarCodecConf, XbarDaiLink};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::marker::PhantomData;
use errno::{Errno, Result};
use log::{debug, warn};

/// The DAI links of one sound card: a link per crossbar port of `L`,
/// followed by any links the board appends.
pub struct DaiLinkTable<L: XbarDaiLink> {
    links: Vec<DaiLink>,
    _soc: PhantomData<L>,
}

impl<L: XbarDaiLink> DaiLinkTable<L> {
    pub fn new() -> Self {
        DaiLinkTable {
            links: L::ALL.iter().map(|link| DaiLink::new(link.name())).collect(),
            _soc: PhantomData,
        }
    }

    pub fn links(&self) -> &[DaiLink] {
        &self.links
    }

    pub fn get(&self, link: L) -> Option<&DaiLink> {
        self.links.get(link.index())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Drops every link, crossbar ones included.
    pub fn remove(&mut self) {
        debug!("{}: removing {} DAI links", L::SOC, self.links.len());
        self.links.clear();
    }

    /// Appends `links` after the current ones and returns the new total.
    pub fn append(&mut self, links: &[DaiLink]) -> usize {
        self.links.extend_from_slice(links);
        self.links.len()
    }

    pub fn get_mut_by_index(&mut self, index: usize) -> Result<&mut DaiLink> {
        let len = self.links.len();
        self.links.get_mut(index).ok_or_else(|| {
            warn!("{}: DAI link {} out of range ({} links)", L::SOC, index, len);
            Errno::InvalidArgs
        })
    }

    pub fn set_ops(&mut self, link: L, ops: Arc<dyn SocOps>) -> Result<()> {
        self.get_mut_by_index(link.index())?.ops = Some(ops);
        Ok(())
    }

    pub fn set_init(&mut self, link: L, init: DaiInit) -> Result<()> {
        self.get_mut_by_index(link.index())?.init = Some(init);
        Ok(())
    }

    pub fn set_params(&mut self, link: L, params: PcmStream) -> Result<()> {
        self.get_mut_by_index(link.index())?.params = Some(params);
        Ok(())
    }

    pub fn set_fmt(&mut self, link: L, fmt: DaiFormat) -> Result<()> {
        self.get_mut_by_index(link.index())?.dai_fmt = fmt;
        Ok(())
    }
}

impl<L: XbarDaiLink> Default for DaiLinkTable<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Codec configurations: one per crossbar module of `C`, then appended ones.
pub struct CodecConfTable<C: XbarCodecConf> {
    confs: Vec<CodecConf>,
    _soc: PhantomData<C>,
}

impl<C: XbarCodecConf> CodecConfTable<C> {
    pub fn new() -> Self {
        CodecConfTable {
            confs: C::ALL.iter().map(|conf| CodecConf::new(conf.name())).collect(),
            _soc: PhantomData,
        }
    }

    pub fn confs(&self) -> &[CodecConf] {
        &self.confs
    }

    pub fn get(&self, conf: C) -> Option<&CodecConf> {
        self.confs.get(conf.index())
    }

    pub fn len(&self) -> usize {
        self.confs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confs.is_empty()
    }

    pub fn remove(&mut self) {
        debug!("{}: removing {} codec configurations", C::SOC, self.confs.len());
        self.confs.clear();
    }

    /// Appends `confs` and returns the new total.
    pub fn append(&mut self, confs: &[CodecConf]) -> usize {
        self.confs.extend_from_slice(confs);
        self.confs.len()
    }
}

impl<C: XbarCodecConf> Default for CodecConfTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
