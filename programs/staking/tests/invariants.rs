use fixtures::prelude::*;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[derive(Debug, Clone, Copy)]
enum Step {
    Stake(usize, u64),
    Withdraw(usize, u64),
    Distribute(u64),
}

use Step::*;

fn run(test_f: &TestFixture, steps: &[Step]) {
    let supply = test_f.host.supply();

    for step in steps {
        let res = match *step {
            Stake(i, amount) => test_f.participant(i).try_stake(amount).map(|_| ()),
            Withdraw(i, amount) => test_f.participant(i).try_withdraw(amount).map(|_| ()),
            Distribute(amount) => test_f.owner.try_distribute_rewards(amount).map(|_| ()),
        };
        // Rejected steps must leave state consistent too
        res.ok();

        let pool = test_f.pool();
        let staked: u64 = test_f
            .participants
            .iter()
            .filter_map(|p| p.user_stake())
            .map(|user_stake| user_stake.amount)
            .sum();
        assert_eq!(pool.total_staked, staked, "after {:?}", step);
        assert!(test_f.custody_balance() >= pool.total_staked);
        assert_eq!(test_f.host.supply(), supply, "tokens created or lost");
        test_f.host.verify().unwrap();
    }
}

#[test_case(&[Stake(0, 100), Distribute(50), Withdraw(0, 150)] ; "stake reward full exit")]
#[test_case(
    &[
        Stake(0, 100),
        Stake(1, 300),
        Distribute(40),
        Withdraw(1, 330),
        Withdraw(0, 110),
    ] ; "two stakers exit"
)]
#[test_case(
    &[
        Distribute(7),
        Stake(2, 3),
        Stake(1, 5),
        Distribute(11),
        Withdraw(2, 4),
        Distribute(13),
        Stake(0, 17),
    ] ; "odd amounts"
)]
#[test_case(
    &[
        Stake(0, 10),
        Withdraw(0, 20),
        Stake(0, 0),
        Withdraw(1, 1),
        Distribute(0),
        Withdraw(0, 10),
    ] ; "rejected steps"
)]
#[test_case(
    &[
        Stake(0, 1),
        Distribute(999),
        Withdraw(0, 1_000),
        Distribute(1),
        Stake(1, 1_000),
    ] ; "single unit staker"
)]
fn invariants_hold_over_sequences(steps: &[Step]) {
    let test_f = TestFixture::new(Some(TestSettings::with_participants(vec![1_000; 3])));
    run(&test_f, steps);
}

#[test]
fn full_exit_returns_everything() -> anyhow::Result<()> {
    let test_f = TestFixture::new(Some(TestSettings::with_participants(vec![1_000; 3])));

    run(
        &test_f,
        &[
            Stake(0, 100),
            Stake(1, 200),
            Stake(2, 300),
            Distribute(60),
            Withdraw(1, 50),
            Distribute(55),
        ],
    );

    for participant in &test_f.participants {
        let balance = participant.effective_balance();
        if balance > 0 {
            participant.try_withdraw(balance)?;
        }
    }

    let pool = test_f.pool();
    assert_eq!(pool.total_staked, 0);
    assert_eq!(pool.total_rewards_distributed, 115);
    // Only rounding dust can stay behind in custody
    assert!(test_f.custody_balance() < 3);
    test_f.host.verify()?;

    Ok(())
}
