// Ranking workflow: session state, the controller operations, and feedback export.
// All service traffic goes through ranking_client::RankingService.

pub mod controller;
pub mod export;
pub mod state;
