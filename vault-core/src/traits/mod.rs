pub mod archive;
pub mod clusterer;
pub mod sinks;
pub mod stress_probe;

pub use archive::IScarArchive;
pub use clusterer::IScarClusterer;
pub use sinks::{IEntropySink, IQuarantineSink};
pub use stress_probe::{IStressProbe, StressSignals};
