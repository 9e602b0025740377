use std::collections::{BTreeMap, HashMap};

use eyre::Result;
use reservation_core::SeatId;
use reservation_tests::TestCtx;

/// Collects the occupancy of every section and checks the seat set did not change.
#[allow(unused)]
pub async fn all_seats(ctx: &TestCtx) -> Result<BTreeMap<SeatId, String>> {
    let mut seats = BTreeMap::new();
    for section in &ctx.sections {
        let section_seats = ctx
            .api
            .get_seats_by_section(&section.to_string())
            .await?
            .result?;
        assert_eq!(
            section_seats.len(),
            ctx.seats_per_section as usize,
            "Section {section} must always hold {} seats.",
            ctx.seats_per_section
        );
        assert!(
            section_seats.keys().all(|seat| seat.section() == *section),
            "Section {section} must only list its own seats."
        );
        seats.extend(section_seats);
    }
    assert_eq!(seats.len(), ctx.capacity());
    Ok(seats)
}

/// Checks that seats and tickets agree: every ticket's seat is held by its owner
/// and every held seat belongs to a ticket. Returns the seat of every holder.
#[allow(unused)]
pub async fn assert_consistent(ctx: &TestCtx) -> Result<HashMap<String, SeatId>> {
    let mut holders = HashMap::new();
    for (seat, holder) in all_seats(ctx).await? {
        if holder.is_empty() {
            continue;
        }
        let previous = holders.insert(holder.clone(), seat);
        assert!(
            previous.is_none(),
            "{holder} must not hold two seats ({seat} and {previous:?})."
        );
        let ticket = ctx.api.get_ticket(&holder).await?.result?;
        assert_eq!(
            ticket.seat, seat,
            "The ticket of {holder} must point to the seat it holds."
        );
    }
    Ok(holders)
}
