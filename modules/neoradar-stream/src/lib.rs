pub mod detail;
pub mod fetcher;
pub mod normalize;
pub mod risk;
pub mod session;
pub mod sink;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use detail::{DetailLookup, LookupError};
pub use fetcher::{FeedFailure, FeedFetcher};
pub use normalize::{clean_name, normalize, score_record};
pub use risk::{risk_score, RiskInputs, RISK_CEILING, RISK_FLOOR};
pub use session::{SessionPhase, SessionState, StreamSession};
pub use sink::{channel, ChannelSink, EventSink, SinkClosed};
pub use traits::NeoSource;
