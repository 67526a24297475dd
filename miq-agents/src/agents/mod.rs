mod archive;
mod audience;
mod brand_safety;
mod caption;
mod carbon;
mod clip;
mod compliance;
mod deepfake;
mod fact_check;
mod ingest_transcode;
mod localization;
mod newsroom;
mod ott;
mod playout;
mod production_director;
mod rights;
mod signal_quality;
mod social;
mod trending;

pub use archive::ArchiveAgent;
pub use audience::AudienceAgent;
pub use brand_safety::BrandSafetyAgent;
pub use caption::CaptionAgent;
pub use carbon::CarbonAgent;
pub use clip::ClipAgent;
pub use compliance::ComplianceAgent;
pub use deepfake::DeepfakeAgent;
pub use fact_check::FactCheckAgent;
pub use ingest_transcode::IngestTranscodeAgent;
pub use localization::LocalizationAgent;
pub use newsroom::NewsroomAgent;
pub use ott::OttAgent;
pub use playout::PlayoutAgent;
pub use production_director::ProductionDirectorAgent;
pub use rights::RightsAgent;
pub use signal_quality::SignalQualityAgent;
pub use social::SocialAgent;
pub use trending::TrendingAgent;
