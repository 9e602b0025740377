use std::collections::HashSet;

use eyre::Result;
use futures::future::join_all;
use nanorand::Rng;
use reservation_core::{ErrorKind, PurchaseRequest, SeatId, User};
use reservation_tests::TestCtxBuilder;

mod util;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30_000)]
async fn test_concurrent_purchases_get_distinct_seats() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_handler_threads(8)
        .build()
        .await?;
    let n = ctx.capacity();

    let handles = (0..n).map(|_| {
        let api = ctx.api.clone();
        tokio::spawn(async move {
            let mut passenger = api.create_passenger();
            passenger.purchase("London", "Paris").await
        })
    });
    let mut seats = HashSet::new();
    for response in join_all(handles).await {
        let ticket = response??.result?;
        assert!(
            seats.insert(ticket.seat),
            "Seat {} must not be sold twice.",
            ticket.seat
        );
    }
    assert_eq!(seats.len(), n);

    let holders = util::assert_consistent(&ctx).await?;
    assert_eq!(holders.len(), n, "Exactly {n} seats must be occupied.");

    ctx.finish().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30_000)]
async fn test_oversubscribed_train() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_sections("AB")
        .with_seats_per_section(20)
        .with_handler_threads(8)
        .build()
        .await?;

    let handles = (0..60).map(|_| {
        let api = ctx.api.clone();
        tokio::spawn(async move {
            let mut passenger = api.create_passenger();
            passenger.purchase("London", "Paris").await
        })
    });
    let mut sold = 0;
    let mut exhausted = 0;
    for response in join_all(handles).await {
        match response??.result {
            Ok(_) => sold += 1,
            Err(err) if err.kind == ErrorKind::ResourceExhausted => exhausted += 1,
            Err(err) => panic!("Unexpected error: {err}"),
        }
    }
    assert_eq!(sold, 40, "Every seat must be sold.");
    assert_eq!(exhausted, 20, "The remaining purchases must be refused.");
    util::assert_consistent(&ctx).await?;

    ctx.finish().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30_000)]
async fn test_concurrent_duplicates() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_handler_threads(8)
        .build()
        .await?;

    let handles = (0..20).map(|i| {
        let api = ctx.api.clone();
        tokio::spawn(async move {
            let request = PurchaseRequest::new(
                format!("Station {i}"),
                "Paris",
                User::new("same@example.com", "Same", "User"),
            );
            api.purchase_ticket(&request).await
        })
    });
    let mut sold = 0;
    for response in join_all(handles).await {
        match response??.result {
            Ok(_) => sold += 1,
            Err(err) => assert_eq!(err.kind, ErrorKind::DuplicateResource),
        }
    }
    assert_eq!(sold, 1, "Exactly one purchase per email must succeed.");
    assert_eq!(util::assert_consistent(&ctx).await?.len(), 1);

    ctx.finish().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(60_000)]
async fn test_random_workload_keeps_state_consistent() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_sections("ABC")
        .with_seats_per_section(10)
        .with_handler_threads(8)
        .build()
        .await?;
    let sections = ctx.sections.clone();
    let seats_per_section = ctx.seats_per_section;

    let handles = (0..40).map(|_| {
        let api = ctx.api.clone();
        let sections = sections.clone();
        tokio::spawn(async move {
            let mut rng = nanorand::WyRand::new();
            let mut passenger = api.create_passenger();
            for _ in 0..50 {
                match rng.generate_range(0..4u8) {
                    0 => {
                        passenger.purchase("London", "Paris").await?;
                    }
                    1 => {
                        let section = sections[rng.generate_range(0..sections.len())];
                        let number = rng.generate_range(1..=seats_per_section);
                        passenger.change_seat(SeatId::new(section, number)).await?;
                    }
                    2 => {
                        passenger.cancel().await?;
                    }
                    _ => {
                        // what the passenger believes must match the service
                        match passenger.ticket().await?.result {
                            Ok(ticket) => assert_eq!(Some(ticket.seat), passenger.seat),
                            Err(err) => {
                                assert_eq!(err.kind, ErrorKind::NotFound);
                                assert_eq!(passenger.seat, None);
                            }
                        }
                    }
                }
            }
            eyre::Ok(())
        })
    });
    for result in join_all(handles).await {
        result??;
    }
    util::assert_consistent(&ctx).await?;

    ctx.finish().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(30_000)]
async fn test_tiny_queue_still_answers_everybody() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_queue_capacity(1)
        .with_handler_threads(16)
        .build()
        .await?;

    let handles = (0..200).map(|i| {
        let api = ctx.api.clone();
        tokio::spawn(async move { api.get_ticket(&format!("{i}@example.com")).await })
    });
    for response in join_all(handles).await {
        assert_eq!(response??.err_kind()?, ErrorKind::NotFound);
    }

    ctx.finish().await;
    Ok(())
}
