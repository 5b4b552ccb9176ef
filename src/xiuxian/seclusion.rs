//! Seclusion: idle time converted into experience.
//!
//! Accrual is lazy. Whenever a secluded player is read, [`checkpoint`] banks the experience
//! earned since the stored start time and moves the start time to `now`.

use chrono::{DateTime, Duration, Utc};

use crate::xiuxian::errors::{Conflict, XiuxianError};
use crate::xiuxian::stats;
use crate::xiuxian::types::PlayerRecord;

/// Default experience per minute before multipliers.
pub const DEFAULT_EXP_PER_MINUTE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SeclusionSummary {
    /// Wall time since the session began, across every checkpoint.
    pub elapsed: Duration,
    /// Experience banked over the whole session.
    pub exp_gained: u64,
    pub total_exp: u64,
}

/// `floor(minutes * exp_per_minute * root_rate * (1 + exp_rate_bonus))`. Negative spans yield 0.
pub fn accrued_exp(elapsed: Duration, exp_per_minute: f64, root_rate: f64, exp_rate_bonus: f64) -> u64 {
    let millis = elapsed.num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    let minutes = millis as f64 / 60_000.0;
    let gain = minutes * exp_per_minute * root_rate * (1.0 + exp_rate_bonus);
    if gain <= 0.0 {
        0
    } else {
        gain.floor() as u64
    }
}

pub fn enter(player: &mut PlayerRecord, now: DateTime<Utc>) -> Result<(), XiuxianError> {
    if player.is_in_seclusion() {
        return Err(XiuxianError::InvalidState(Conflict::InSeclusion));
    }
    player.seclusion_started_at = Some(now);
    player.seclusion_entered_at = Some(now);
    player.seclusion_exp_banked = 0;
    Ok(())
}

/// Bank experience accrued up to `now`. Returns the amount added (0 when not secluded).
pub fn checkpoint(player: &mut PlayerRecord, now: DateTime<Utc>, exp_per_minute: f64) -> u64 {
    let Some(started) = player.seclusion_started_at else {
        return 0;
    };
    let gain = accrued_exp(
        now - started,
        exp_per_minute,
        player.spirit_root.rate(),
        stats::exp_rate_bonus(player),
    );
    player.exp = player.exp.saturating_add(gain);
    player.seclusion_exp_banked = player.seclusion_exp_banked.saturating_add(gain);
    // Never move the start backwards on a clock that went back.
    if now > started {
        player.seclusion_started_at = Some(now);
    }
    gain
}

/// Leave seclusion after one final checkpoint.
pub fn exit(
    player: &mut PlayerRecord,
    now: DateTime<Utc>,
    exp_per_minute: f64,
) -> Result<SeclusionSummary, XiuxianError> {
    let Some(started) = player.seclusion_started_at else {
        return Err(XiuxianError::InvalidState(Conflict::NotInSeclusion));
    };
    let session_start = player.seclusion_entered_at.unwrap_or(started);
    checkpoint(player, now, exp_per_minute);
    let exp_gained = std::mem::take(&mut player.seclusion_exp_banked);
    player.seclusion_started_at = None;
    player.seclusion_entered_at = None;
    let elapsed = (now - session_start).max(Duration::zero());
    Ok(SeclusionSummary {
        elapsed,
        exp_gained,
        total_exp: player.exp,
    })
}
