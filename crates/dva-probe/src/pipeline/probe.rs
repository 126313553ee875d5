use std::path::PathBuf;

use dva_paths::HostDirs;
use tracing::debug;

use crate::{
    backend::{
        BackendKind, Capabilities, DependencyStatus, DurationBackend, dependency_report, ffprobe::FfprobeBackend,
        ffprobe::FfprobeRunner,
    },
    pipeline::config::ProbeConfig,
};

#[derive(Default)]
pub struct ProbeBuilder {
    cfg: ProbeConfig,
    capabilities: Option<Capabilities>,
    dirs: Option<HostDirs>,
}

impl ProbeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, cfg: ProbeConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg.ffprobe_path = path.into();
        self
    }

    pub fn default_sample_rate(mut self, sample_rate: u32) -> Self {
        self.cfg.default_sample_rate = sample_rate;
        self
    }

    /// Fija la tabla de backends en vez de detectarla.
    pub fn capabilities(mut self, caps: Capabilities) -> Self {
        self.capabilities = Some(caps);
        self
    }

    /// Carpetas donde buscar nombres de fichero relativos.
    pub fn host_dirs(mut self, dirs: HostDirs) -> Self {
        self.dirs = Some(dirs);
        self
    }

    pub fn build(self) -> Probe {
        let runner = FfprobeRunner::new(self.cfg.ffprobe_path.clone());
        let caps = self
            .capabilities
            .unwrap_or_else(|| Capabilities::detect(&runner, self.cfg.availability_timeout()));
        debug!(?caps, "probe capabilities");

        Probe {
            cfg: self.cfg,
            caps,
            dirs: self.dirs,
            runner,
        }
    }
}

pub struct Probe {
    cfg: ProbeConfig,
    caps: Capabilities,
    dirs: Option<HostDirs>,
    runner: FfprobeRunner,
}

impl Probe {
    pub fn builder() -> ProbeBuilder {
        ProbeBuilder::default()
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.cfg
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn dirs(&self) -> Option<&HostDirs> {
        self.dirs.as_ref()
    }

    pub fn runner(&self) -> &FfprobeRunner {
        &self.runner
    }

    pub fn dependency_report(&self) -> Vec<DependencyStatus> {
        dependency_report(&self.runner, self.cfg.availability_timeout())
    }

    /// Instancia un backend si está disponible en este proceso.
    pub(crate) fn backend(&self, kind: BackendKind) -> Option<Box<dyn DurationBackend>> {
        if !self.caps.contains(kind.capability()) {
            return None;
        }

        match kind {
            #[cfg(feature = "lofty")]
            BackendKind::Tags => Some(Box::new(crate::backend::tags::TagsBackend)),
            #[cfg(feature = "symphonia")]
            BackendKind::Decode => Some(Box::new(crate::backend::decode::DecodeBackend)),
            BackendKind::Ffprobe => Some(Box::new(FfprobeBackend::new(
                self.runner.clone(),
                self.cfg.duration_timeout(),
            ))),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_capabilities_gate_backends() {
        let probe = Probe::builder().capabilities(Capabilities::empty()).build();
        assert!(probe.backend(BackendKind::Ffprobe).is_none());
        assert!(probe.backend(BackendKind::Tags).is_none());

        let probe = Probe::builder().capabilities(Capabilities::FFPROBE).build();
        let backend = probe.backend(BackendKind::Ffprobe).unwrap();
        assert_eq!(backend.kind(), BackendKind::Ffprobe);
    }
}
