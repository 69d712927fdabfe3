use rand::{SeedableRng as _, rngs::StdRng};

use super::*;

#[test]
fn frequencies_follow_tickets() {
    let sampler = TicketSampler::new([(1, "rare"), (50, "a"), (50, "b")]).unwrap();
    assert_eq!(sampler.total(), 101);

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut counts = [0usize; 3];
    for _ in 0..10_000 {
        match *sampler.draw(&mut rng) {
            "rare" => counts[0] += 1,
            "a" => counts[1] += 1,
            "b" => counts[2] += 1,
            other => panic!("unexpected draw {other}"),
        }
    }
    // Expected roughly 99 / 4950 / 4950.
    assert!((20..=250).contains(&counts[0]), "{counts:?}");
    assert!((4_600..=5_300).contains(&counts[1]), "{counts:?}");
    assert!((4_600..=5_300).contains(&counts[2]), "{counts:?}");
}

#[test]
fn zero_ticket_entries_are_never_drawn() {
    let sampler = TicketSampler::new([(0, 'x'), (3, 'y'), (0, 'z')]).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..1_000 {
        assert_eq!(*sampler.draw(&mut rng), 'y');
    }
}

#[test]
fn single_entry_always_wins() {
    let sampler = TicketSampler::new([(7, 42)]).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    assert!((0..100).all(|_| *sampler.draw(&mut rng) == 42));
}

#[test]
fn empty_or_ticketless_is_a_config_error() {
    assert!(matches!(
        TicketSampler::<u8>::new([]),
        Err(MashupError::Config(_))
    ));
    assert!(matches!(
        TicketSampler::new([(0, 1u8), (0, 2u8)]),
        Err(MashupError::Config(_))
    ));
}
