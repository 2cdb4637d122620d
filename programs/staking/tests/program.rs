use fixtures::{assert_custom_error, prelude::*};
use pretty_assertions::assert_eq;
use solana_program_test::tokio;
use staking::{constants::STAKING_PAUSED, prelude::*};
use test_case::test_case;

#[test_case(MintKind::SplToken)]
#[test_case(MintKind::Token22)]
#[tokio::test]
async fn program_stake_reward_full_exit(mint: MintKind) -> anyhow::Result<()> {
    let test_f = ProgramFixture::new(Some(ProgramSettings {
        mint,
        participant_balances: vec![1_000],
        ..ProgramSettings::default()
    }))
    .await;
    let p = test_f.participant(0);

    p.try_stake(100).await?;
    assert_eq!(test_f.custody_balance().await, 100);
    assert_eq!(test_f.pool().await.total_staked, 100);

    test_f.owner.try_distribute_rewards(50).await?;
    assert_eq!(test_f.custody_balance().await, 150);
    assert_eq!(test_f.owner.balance().await, 950);

    p.try_withdraw(150).await?;

    assert_eq!(p.balance().await, 1_050);
    assert_eq!(test_f.custody_balance().await, 0);
    assert_eq!(test_f.pool().await.total_staked, 0);

    let user_stake = p.try_load_user_stake().await.unwrap();
    assert_eq!(user_stake.owner, p.key());
    assert_eq!(user_stake.amount, 0);
    assert_eq!(user_stake.accrued_rewards, 0);
    assert_eq!(user_stake.total_rewards_claimed, 50);

    Ok(())
}

#[tokio::test]
async fn program_rewards_split_pro_rata() -> anyhow::Result<()> {
    let test_f = ProgramFixture::new(None).await;
    let (p, q) = (test_f.participant(0), test_f.participant(1));

    p.try_stake(100).await?;
    q.try_stake(300).await?;
    test_f.owner.try_distribute_rewards(40).await?;

    q.try_withdraw(330).await?;
    p.try_withdraw(110).await?;

    assert_eq!(p.balance().await, 1_010);
    assert_eq!(q.balance().await, 1_030);
    assert_eq!(test_f.custody_balance().await, 0);
    assert_eq!(test_f.pool().await.total_staked, 0);

    Ok(())
}

#[tokio::test]
async fn program_withdraw_above_stake_fails() -> anyhow::Result<()> {
    let test_f = ProgramFixture::new(None).await;
    let p = test_f.participant(0);

    p.try_stake(100).await?;

    let res = p.try_withdraw(200).await;
    assert!(res.is_err());
    assert_custom_error!(res.unwrap_err(), StakingError::InsufficientStake);

    assert_eq!(p.balance().await, 900);
    assert_eq!(test_f.custody_balance().await, 100);
    assert_eq!(p.try_load_user_stake().await.unwrap().amount, 100);

    Ok(())
}

#[tokio::test]
async fn program_initialize_twice_fails() -> anyhow::Result<()> {
    let test_f = ProgramFixture::new(None).await;
    let owner = test_f.pool().await.owner;
    assert_eq!(owner, test_f.owner.key());

    let res = test_f.owner.try_initialize().await;
    assert!(res.is_err());
    assert_custom_error!(res.unwrap_err(), StakingError::AlreadyInitialized);

    let res = test_f.participant(0).try_initialize().await;
    assert!(res.is_err());
    assert_custom_error!(res.unwrap_err(), StakingError::AlreadyInitialized);

    assert_eq!(test_f.pool().await.owner, owner);

    Ok(())
}

#[tokio::test]
async fn program_withdraw_without_record_is_not_found() -> anyhow::Result<()> {
    let test_f = ProgramFixture::new(None).await;
    let (p, q) = (test_f.participant(0), test_f.participant(1));

    q.try_stake(100).await?;

    let res = p.try_withdraw(1).await;
    assert!(res.is_err());
    assert_custom_error!(res.unwrap_err(), StakingError::NotFound);

    assert!(p.try_load_user_stake().await.is_none());
    assert_eq!(p.balance().await, 1_000);
    assert_eq!(test_f.custody_balance().await, 100);

    Ok(())
}

#[tokio::test]
async fn program_distribute_rewards_requires_owner() -> anyhow::Result<()> {
    let test_f = ProgramFixture::new(None).await;
    let p = test_f.participant(0);

    p.try_stake(100).await?;

    let res = p.try_distribute_rewards(50).await;
    assert!(res.is_err());
    assert_custom_error!(res.unwrap_err(), StakingError::Unauthorized);

    assert_eq!(test_f.custody_balance().await, 100);
    assert_eq!(test_f.pool().await.total_rewards_distributed, 0);

    Ok(())
}

#[tokio::test]
async fn program_paused_pool_rejects_stake() -> anyhow::Result<()> {
    let test_f = ProgramFixture::new(None).await;
    let p = test_f.participant(0);

    test_f
        .owner
        .try_configure(PoolConfigOpt {
            owner: None,
            flags: Some(STAKING_PAUSED),
        })
        .await?;

    let res = p.try_stake(100).await;
    assert!(res.is_err());
    assert_custom_error!(res.unwrap_err(), StakingError::PoolPaused);
    assert!(p.try_load_user_stake().await.is_none());

    Ok(())
}

#[test_case(0)]
#[test_case(100)]
#[tokio::test]
async fn program_transfer_fee_mint_is_rejected(basis_points: u16) -> anyhow::Result<()> {
    let test_f = ProgramFixture::new(Some(ProgramSettings {
        mint: MintKind::Token22WithFee { basis_points },
        initialize_pool: false,
        ..ProgramSettings::default()
    }))
    .await;

    let res = test_f.owner.try_initialize().await;
    assert!(res.is_err());
    assert_custom_error!(res.unwrap_err(), StakingError::InvalidPoolConfig);

    assert!(test_f.try_pool().await.is_none());

    Ok(())
}
