use crate::domain::model::{PriceSnapshot, UsdWei, Wei};
use crate::utils::error::{FundMeError, Result};
use primitive_types::U256;

/// Largest feed precision whose scale factor still fits in a `u128`.
pub const MAX_FEED_DECIMALS: u8 = 36;

fn checked_rate(snapshot: &PriceSnapshot) -> Result<u128> {
    if snapshot.rate <= 0 {
        return Err(FundMeError::Oracle {
            message: format!("non-positive rate {}", snapshot.rate),
        });
    }
    if snapshot.decimals > MAX_FEED_DECIMALS {
        return Err(FundMeError::Oracle {
            message: format!(
                "feed precision of {} decimals exceeds {}",
                snapshot.decimals, MAX_FEED_DECIMALS
            ),
        });
    }
    // rate > 0 here, so the cast is lossless
    Ok(snapshot.rate as u128)
}

/// USD value (18 decimals) of one whole native unit.
pub fn price_in_usd(snapshot: &PriceSnapshot) -> Result<UsdWei> {
    conversion_rate(crate::domain::model::WEI_PER_UNIT, snapshot)
}

/// USD value (18 decimals) of `amount` wei at the snapshot's rate.
///
/// Computed as `amount * rate / 10^decimals` in 256-bit arithmetic, which
/// equals scaling the rate to 18 decimals first and dividing by `10^18`
/// afterwards. The product of two 128-bit values always fits, so only a result
/// above `u128::MAX` is reported as overflow. Rounds toward zero.
pub fn conversion_rate(amount: Wei, snapshot: &PriceSnapshot) -> Result<UsdWei> {
    let rate = checked_rate(snapshot)?;
    let scale = U256::exp10(usize::from(snapshot.decimals));

    let usd = U256::from(amount) * U256::from(rate) / scale;
    if usd > U256::from(u128::MAX) {
        return Err(FundMeError::ArithmeticOverflow {
            operation: format!("converting {} wei at rate {}", amount, rate),
        });
    }
    Ok(usd.low_u128())
}
