use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing_flame::{FlameLayer, FlushGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, prelude::*, Registry};

/// Tracing for solver runs: a compact fmt layer for the driver's
/// per-connection debug events plus a flame layer for profiling rip-up
/// cascades. Keep the guard alive for the whole run so the folded stack
/// file is flushed.
pub struct FlameTracer {
    _guard: FlushGuard<BufWriter<File>>,
}

impl FlameTracer {
    pub fn install() -> Self {
        Self::install_with_flame_file("./hyperroute.folded")
    }

    pub fn install_with_flame_file(path: impl AsRef<Path>) -> Self {
        let (flame_layer, guard) =
            FlameLayer::with_file(path).expect("flame output file must be writable");

        let fmt_layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_span_events(FmtSpan::CLOSE);

        Registry::default()
            .with(fmt_layer)
            .with(flame_layer)
            .try_init()
            .expect("a global tracing subscriber is already installed");

        Self { _guard: guard }
    }
}
