//! Row types for the data model in spec §3. Money-of-account amounts are
//! exact integer base units; derived prices are `f64` here (sqlite has no
//! arbitrary-precision decimal type) but are always computed from the
//! integer reserves, never accumulated in floating point.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    PumpFun,
    RaydiumLaunchpad,
    PumpSwap,
    Raydium,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PumpFun => "pumpfun",
            Self::RaydiumLaunchpad => "raydiumLaunchpad",
            Self::PumpSwap => "pumpswap",
            Self::Raydium => "raydium",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pumpfun" => Some(Self::PumpFun),
            "raydiumLaunchpad" => Some(Self::RaydiumLaunchpad),
            "pumpswap" => Some(Self::PumpSwap),
            "raydium" => Some(Self::Raydium),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    Active,
    Graduated,
    Closed,
    Failed,
}

impl PoolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Graduated => "graduated",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "graduated" => Self::Graduated,
            "closed" => Self::Closed,
            "failed" => Self::Failed,
            _ => Self::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub id: i64,
    pub mint_address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub venue: Venue,
    pub creation_sig: String,
    pub creation_time: DateTime<Utc>,
    pub creator: String,
    pub is_graduated: bool,
    pub graduation_sig: Option<String>,
    pub graduation_time: Option<DateTime<Utc>>,
}

/// Fields a caller may update via `UpsertToken`. Venue and decimals are
/// intentionally absent — they are set once at creation (spec §3 invariant).
#[derive(Debug, Clone, Default)]
pub struct TokenUpdate {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub is_graduated: Option<bool>,
    pub graduation_sig: Option<String>,
    pub graduation_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Pool {
    pub id: i64,
    pub pool_address: String,
    pub token_id: i64,
    pub base_mint: String,
    pub quote_mint: String,
    pub venue: Venue,
    pub status: PoolStatus,
    pub virtual_base_reserves: u64,
    pub virtual_quote_reserves: u64,
    pub real_base_reserves: u64,
    pub real_quote_reserves: u64,
    pub bonding_curve_progress: Option<f64>,
    pub latest_price: Option<f64>,
    pub latest_price_usd: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct PoolReservesUpdate {
    pub virtual_base_reserves: Option<u64>,
    pub virtual_quote_reserves: Option<u64>,
    pub real_base_reserves: Option<u64>,
    pub real_quote_reserves: Option<u64>,
    pub latest_price: Option<f64>,
    pub latest_price_usd: Option<f64>,
    pub bonding_curve_progress: Option<f64>,
    pub status: Option<PoolStatus>,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub signature: String,
    pub block_time: DateTime<Utc>,
    pub pool_id: i64,
    pub token_id: i64,
    pub slot: u64,
    pub kind: TradeType,
    pub user: String,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub price_per_token: Option<f64>,
    pub pre_base_reserves: u64,
    pub pre_quote_reserves: u64,
    pub post_base_reserves: u64,
    pub post_quote_reserves: u64,
    pub fees: u64,
    pub raw_metadata: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Candle {
    pub token_id: i64,
    pub minute: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume_sol: u64,
    pub volume_token: u64,
    pub trade_count: u64,
    pub buyer_count: u64,
    pub seller_count: u64,
}

#[derive(Debug, Clone)]
pub struct SolUsdPrice {
    pub price_time: DateTime<Utc>,
    pub price_usd: f64,
}

#[derive(Debug, Clone)]
pub struct HolderScore {
    pub token_id: i64,
    pub score_time: DateTime<Utc>,
    pub distribution_score: u32,
    pub quality_score: u32,
    pub activity_score: u32,
    pub total_score: u32,
    pub gini: f64,
    pub top1_pct_concentration: f64,
    pub holder_count: u64,
    pub bot_ratio: f64,
    pub smart_money_ratio: f64,
    pub credits_used: u64,
}

#[derive(Debug, Clone)]
pub struct WalletAnalysis {
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub tx_count: u64,
    pub sol_balance: u64,
    pub wallet_age_days: f64,
    pub is_bot: bool,
    pub is_smart_money: bool,
    pub risk_score: f64,
    pub last_analyzed: DateTime<Utc>,
}

pub type StoreResult<T> = Result<T, crate::errors::CoreError>;
