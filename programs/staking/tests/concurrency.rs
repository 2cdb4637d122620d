use fixtures::prelude::*;
use pretty_assertions::assert_eq;
use staking::prelude::*;
use std::thread;

#[test]
fn stale_commit_is_rejected() -> anyhow::Result<()> {
    let test_f = TestFixture::new(None);
    let (p, q) = (test_f.participant(0), test_f.participant(1));

    let first = test_f.host.prepare(&p.stake_op(100))?;
    let second = test_f.host.prepare(&q.stake_op(300))?;

    test_f.host.commit(first)?;
    let res = test_f.host.commit(second);

    assert_staking_error!(res.unwrap_err(), StakingError::StaleRecord);
    assert_eq!(test_f.pool().total_staked, 100);
    assert!(q.user_stake().is_none());
    assert_eq!(q.balance(), 1_000);
    test_f.host.verify()?;

    // A fresh attempt goes through
    test_f.host.execute_with_retry(q.stake_op(300), 3)?;
    assert_eq!(test_f.pool().total_staked, 400);

    Ok(())
}

#[test]
fn stale_stake_record_is_rejected() -> anyhow::Result<()> {
    let test_f = TestFixture::new(None);
    let p = test_f.participant(0);
    p.try_stake(100)?;

    let withdraw = test_f.host.prepare(&p.withdraw_op(100))?;
    let other_withdraw = test_f.host.prepare(&p.withdraw_op(100))?;

    test_f.host.commit(withdraw)?;
    let res = test_f.host.commit(other_withdraw);

    // Paid out once only
    assert_staking_error!(res.unwrap_err(), StakingError::StaleRecord);
    assert_eq!(p.balance(), 1_000);
    assert_eq!(test_f.custody_balance(), 0);

    Ok(())
}

#[test]
fn distribution_racing_a_stake_is_rejected() -> anyhow::Result<()> {
    let test_f = TestFixture::new(None);
    let (p, q) = (test_f.participant(0), test_f.participant(1));
    p.try_stake(100)?;

    // Prepared while only P is staked
    let distribution = test_f.host.prepare(&fixtures::host::Operation::DistributeRewards {
        caller: test_f.owner.caller,
        amount: 40,
    })?;
    q.try_stake(300)?;

    let res = test_f.host.commit(distribution);

    assert_staking_error!(res.unwrap_err(), StakingError::StaleRecord);
    assert_eq!(p.effective_balance(), 100);
    assert_eq!(test_f.owner.balance(), 1_000);

    Ok(())
}

#[test]
fn concurrent_stakes_are_serialized() -> anyhow::Result<()> {
    let test_f = TestFixture::new(Some(TestSettings::with_participants(vec![1_000; 4])));

    let handles: Vec<_> = test_f
        .participants
        .iter()
        .cloned()
        .map(|participant| {
            let host = test_f.host.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    host.execute_with_retry(participant.stake_op(10), 1_000)
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(test_f.pool().total_staked, 400);
    assert_eq!(test_f.custody_balance(), 400);
    for participant in &test_f.participants {
        assert_eq!(participant.user_stake().unwrap().amount, 100);
        assert_eq!(participant.balance(), 900);
    }
    test_f.host.verify()?;

    Ok(())
}
