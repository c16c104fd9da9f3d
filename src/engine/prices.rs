use crate::data::{PriceType, ResolvedBarDatum};
use crate::error::EngineResult;
use crate::portfolio::Position;

//revalues lots with the bar's open (new_bar) or close prices
//
//on a new bar every repriced lot ages by one bar. lots whose symbol is missing
//from the bar are returned unchanged and do not age, as the bar is not theirs
pub fn update_prices(
    positions: &[Position],
    resolved: &[ResolvedBarDatum],
    new_bar: bool,
) -> EngineResult<Vec<Position>> {
    let (price_type, age) = if new_bar {
        (PriceType::Open, 1)
    } else {
        (PriceType::Close, 0)
    };

    positions
        .iter()
        .map(|position| {
            match resolved.iter().find(|data| data.symbol == position.symbol) {
                Some(data) => {
                    position.reprice(data, position.size, price_type, position.bars_held + age)
                }
                None => Ok(position.clone()),
            }
        })
        .collect()
}
