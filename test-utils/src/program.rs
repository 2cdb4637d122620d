use crate::utils::RUST_LOG_DEFAULT;
use anchor_lang::{prelude::*, InstructionData, ToAccountMetas};
use anchor_spl::{
    token::spl_token,
    token_2022::spl_token_2022::{
        self,
        extension::{transfer_fee::instruction::initialize_transfer_fee_config, ExtensionType},
    },
    token_interface::TokenAccount,
};
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction, entrypoint::ProgramResult, instruction::Instruction,
    signature::Keypair, signer::Signer, system_instruction, transaction::Transaction,
};
use staking::{
    prelude::*,
    utils::{find_custody_authority_pda, find_custody_pda, find_pool_pda, find_user_stake_pda},
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

pub const MINT_DECIMALS: u8 = 6;
/// Lamports given to every participant so it can pay for its stake record
pub const PARTICIPANT_LAMPORTS: u64 = 1_000_000_000;

pub fn staking_entry(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    staking::entry(program_id, unsafe { core::mem::transmute(accounts) }, data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintKind {
    SplToken,
    Token22,
    /// Token-2022 mint carrying the transfer fee extension
    Token22WithFee { basis_points: u16 },
}

impl MintKind {
    pub fn token_program(self) -> Pubkey {
        match self {
            MintKind::SplToken => spl_token::id(),
            MintKind::Token22 | MintKind::Token22WithFee { .. } => spl_token_2022::id(),
        }
    }

    fn extensions(self) -> Vec<ExtensionType> {
        match self {
            MintKind::Token22WithFee { .. } => vec![ExtensionType::TransferFeeConfig],
            _ => vec![],
        }
    }

    fn mint_len(self) -> usize {
        ExtensionType::try_calculate_account_len::<spl_token_2022::state::Mint>(&self.extensions())
            .unwrap()
    }

    fn holding_len(self) -> usize {
        let extensions = ExtensionType::get_required_init_account_extensions(&self.extensions());
        ExtensionType::try_calculate_account_len::<spl_token_2022::state::Account>(&extensions)
            .unwrap()
    }
}

/// Shared bank state. Every transaction is prefixed with a distinct compute
/// unit price so repeated identical instructions are not deduplicated.
#[derive(Clone)]
pub struct BankContext {
    pub ctx: Rc<RefCell<ProgramTestContext>>,
    nonce: Rc<Cell<u64>>,
}

impl BankContext {
    pub fn payer(&self) -> Pubkey {
        self.ctx.borrow().payer.pubkey()
    }

    pub async fn process(
        &self,
        ixs: &[Instruction],
        signers: &[&Keypair],
    ) -> std::result::Result<(), BanksClientError> {
        let nonce = self.nonce.get() + 1;
        self.nonce.set(nonce);

        let mut instructions = vec![ComputeBudgetInstruction::set_compute_unit_price(nonce)];
        instructions.extend_from_slice(ixs);

        let mut ctx = self.ctx.borrow_mut();
        let tx = {
            let mut all_signers = vec![&ctx.payer];
            all_signers.extend_from_slice(signers);
            Transaction::new_signed_with_payer(
                &instructions,
                Some(&ctx.payer.pubkey()),
                &all_signers,
                ctx.last_blockhash,
            )
        };

        ctx.banks_client.process_transaction(tx).await
    }

    pub async fn minimum_rent(&self, size: usize) -> u64 {
        self.ctx
            .borrow_mut()
            .banks_client
            .get_rent()
            .await
            .unwrap()
            .minimum_balance(size)
    }

    pub async fn try_load<T: AccountDeserialize>(&self, address: &Pubkey) -> Option<T> {
        let account = self
            .ctx
            .borrow_mut()
            .banks_client
            .get_account(*address)
            .await
            .unwrap()?;

        Some(T::try_deserialize(&mut account.data.as_slice()).unwrap())
    }

    pub async fn load<T: AccountDeserialize>(&self, address: &Pubkey) -> T {
        self.try_load(address).await.unwrap()
    }

    pub async fn token_balance(&self, holding: &Pubkey) -> u64 {
        self.load::<TokenAccount>(holding).await.amount
    }
}

/// A mint and token holdings on the bank.
#[derive(Clone)]
pub struct MintFixture {
    pub bank: BankContext,
    pub key: Pubkey,
    pub kind: MintKind,
}

impl MintFixture {
    pub async fn new(bank: BankContext, kind: MintKind) -> MintFixture {
        let keypair = Keypair::new();
        let payer = bank.payer();
        let token_program = kind.token_program();
        let len = kind.mint_len();

        let mut ixs = vec![system_instruction::create_account(
            &payer,
            &keypair.pubkey(),
            bank.minimum_rent(len).await,
            len as u64,
            &token_program,
        )];
        if let MintKind::Token22WithFee { basis_points } = kind {
            ixs.push(
                initialize_transfer_fee_config(
                    &token_program,
                    &keypair.pubkey(),
                    Some(&payer),
                    Some(&payer),
                    basis_points,
                    u64::MAX,
                )
                .unwrap(),
            );
        }
        ixs.push(
            spl_token_2022::instruction::initialize_mint(
                &token_program,
                &keypair.pubkey(),
                &payer,
                None,
                MINT_DECIMALS,
            )
            .unwrap(),
        );

        bank.process(&ixs, &[&keypair]).await.unwrap();

        MintFixture {
            bank,
            key: keypair.pubkey(),
            kind,
        }
    }

    pub fn token_program(&self) -> Pubkey {
        self.kind.token_program()
    }

    /// New holding owned by `owner`, funded with `amount`.
    pub async fn create_holding(&self, owner: &Pubkey, amount: u64) -> Pubkey {
        let keypair = Keypair::new();
        let token_program = self.token_program();
        let len = self.kind.holding_len();

        let mut ixs = vec![
            system_instruction::create_account(
                &self.bank.payer(),
                &keypair.pubkey(),
                self.bank.minimum_rent(len).await,
                len as u64,
                &token_program,
            ),
            spl_token_2022::instruction::initialize_account(
                &token_program,
                &keypair.pubkey(),
                &self.key,
                owner,
            )
            .unwrap(),
        ];
        if amount > 0 {
            ixs.push(self.make_mint_to_ix(&keypair.pubkey(), amount));
        }

        self.bank.process(&ixs, &[&keypair]).await.unwrap();

        keypair.pubkey()
    }

    pub async fn mint_to(&self, holding: &Pubkey, amount: u64) {
        let ix = self.make_mint_to_ix(holding, amount);
        self.bank.process(&[ix], &[]).await.unwrap();
    }

    fn make_mint_to_ix(&self, holding: &Pubkey, amount: u64) -> Instruction {
        let payer = self.bank.payer();
        spl_token_2022::instruction::mint_to(
            &self.token_program(),
            &self.key,
            holding,
            &payer,
            &[],
            amount,
        )
        .unwrap()
    }
}

/// A funded signer with a token holding, acting through the deployed program.
pub struct ProgramParticipant {
    pub mint: MintFixture,
    pub keypair: Keypair,
    pub holding: Pubkey,
}

impl ProgramParticipant {
    pub fn key(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn user_stake_address(&self) -> Pubkey {
        find_user_stake_pda(&self.key()).0
    }

    pub fn make_initialize_ix(&self) -> Instruction {
        let pool = find_pool_pda().0;
        Instruction {
            program_id: staking::ID,
            accounts: staking::accounts::PoolInitialize {
                owner: self.key(),
                pool,
                mint: self.mint.key,
                custody_authority: find_custody_authority_pda(&pool).0,
                custody: find_custody_pda(&pool).0,
                token_program: self.mint.token_program(),
                system_program: solana_sdk::system_program::ID,
            }
            .to_account_metas(Some(true)),
            data: staking::instruction::Initialize {}.data(),
        }
    }

    pub async fn try_initialize(&self) -> std::result::Result<(), BanksClientError> {
        let ix = self.make_initialize_ix();
        self.mint.bank.process(&[ix], &[&self.keypair]).await
    }

    pub fn make_stake_ix(&self, amount: u64) -> Instruction {
        let pool = find_pool_pda().0;
        Instruction {
            program_id: staking::ID,
            accounts: staking::accounts::UserStakeDeposit {
                participant: self.key(),
                pool,
                user_stake: self.user_stake_address(),
                mint: self.mint.key,
                source: self.holding,
                custody: find_custody_pda(&pool).0,
                token_program: self.mint.token_program(),
                system_program: solana_sdk::system_program::ID,
            }
            .to_account_metas(Some(true)),
            data: staking::instruction::Stake { amount }.data(),
        }
    }

    pub async fn try_stake(&self, amount: u64) -> std::result::Result<(), BanksClientError> {
        let ix = self.make_stake_ix(amount);
        self.mint.bank.process(&[ix], &[&self.keypair]).await
    }

    pub fn make_distribute_rewards_ix(&self, amount: u64) -> Instruction {
        let pool = find_pool_pda().0;
        Instruction {
            program_id: staking::ID,
            accounts: staking::accounts::PoolDistributeRewards {
                owner: self.key(),
                pool,
                mint: self.mint.key,
                funding: self.holding,
                custody: find_custody_pda(&pool).0,
                token_program: self.mint.token_program(),
            }
            .to_account_metas(Some(true)),
            data: staking::instruction::DistributeRewards { amount }.data(),
        }
    }

    pub async fn try_distribute_rewards(
        &self,
        amount: u64,
    ) -> std::result::Result<(), BanksClientError> {
        let ix = self.make_distribute_rewards_ix(amount);
        self.mint.bank.process(&[ix], &[&self.keypair]).await
    }

    pub fn make_withdraw_ix(&self, amount: u64) -> Instruction {
        let pool = find_pool_pda().0;
        Instruction {
            program_id: staking::ID,
            accounts: staking::accounts::UserStakeWithdraw {
                participant: self.key(),
                pool,
                user_stake: self.user_stake_address(),
                mint: self.mint.key,
                destination: self.holding,
                custody: find_custody_pda(&pool).0,
                custody_authority: find_custody_authority_pda(&pool).0,
                token_program: self.mint.token_program(),
            }
            .to_account_metas(Some(true)),
            data: staking::instruction::Withdraw { amount }.data(),
        }
    }

    pub async fn try_withdraw(&self, amount: u64) -> std::result::Result<(), BanksClientError> {
        let ix = self.make_withdraw_ix(amount);
        self.mint.bank.process(&[ix], &[&self.keypair]).await
    }

    pub async fn try_configure(
        &self,
        config: PoolConfigOpt,
    ) -> std::result::Result<(), BanksClientError> {
        let ix = Instruction {
            program_id: staking::ID,
            accounts: staking::accounts::PoolConfigure {
                owner: self.key(),
                pool: find_pool_pda().0,
            }
            .to_account_metas(Some(true)),
            data: staking::instruction::ConfigurePool { config }.data(),
        };
        self.mint.bank.process(&[ix], &[&self.keypair]).await
    }

    pub async fn balance(&self) -> u64 {
        self.mint.bank.token_balance(&self.holding).await
    }

    pub async fn try_load_user_stake(&self) -> Option<UserStake> {
        self.mint.bank.try_load(&self.user_stake_address()).await
    }
}

#[derive(Debug, Clone)]
pub struct ProgramSettings {
    pub mint: MintKind,
    pub owner_balance: u64,
    pub participant_balances: Vec<u64>,
    pub initialize_pool: bool,
}

impl Default for ProgramSettings {
    fn default() -> Self {
        Self {
            mint: MintKind::SplToken,
            owner_balance: 1_000,
            participant_balances: vec![1_000, 1_000],
            initialize_pool: true,
        }
    }
}

/// The staking program loaded into a `ProgramTest` bank, with a mint, a pool
/// owner and funded participants.
pub struct ProgramFixture {
    pub bank: BankContext,
    pub mint: MintFixture,
    pub owner: ProgramParticipant,
    pub participants: Vec<ProgramParticipant>,
}

impl ProgramFixture {
    pub async fn new(settings: Option<ProgramSettings>) -> ProgramFixture {
        solana_logger::setup_with_default(RUST_LOG_DEFAULT);

        let settings = settings.unwrap_or_default();
        let program = ProgramTest::new("staking", staking::ID, processor!(staking_entry));
        let bank = BankContext {
            ctx: Rc::new(RefCell::new(program.start_with_context().await)),
            nonce: Rc::new(Cell::new(0)),
        };

        let mint = MintFixture::new(bank.clone(), settings.mint).await;
        let owner = Self::create_participant(&mint, settings.owner_balance).await;
        if settings.initialize_pool {
            owner.try_initialize().await.unwrap();
        }

        let mut participants = Vec::with_capacity(settings.participant_balances.len());
        for balance in settings.participant_balances {
            participants.push(Self::create_participant(&mint, balance).await);
        }

        ProgramFixture {
            bank,
            mint,
            owner,
            participants,
        }
    }

    async fn create_participant(mint: &MintFixture, balance: u64) -> ProgramParticipant {
        let keypair = Keypair::new();
        let fund_ix = system_instruction::transfer(
            &mint.bank.payer(),
            &keypair.pubkey(),
            PARTICIPANT_LAMPORTS,
        );
        mint.bank.process(&[fund_ix], &[]).await.unwrap();

        let holding = mint.create_holding(&keypair.pubkey(), balance).await;

        ProgramParticipant {
            mint: mint.clone(),
            keypair,
            holding,
        }
    }

    pub fn participant(&self, index: usize) -> &ProgramParticipant {
        &self.participants[index]
    }

    pub async fn pool(&self) -> Pool {
        self.bank.load(&find_pool_pda().0).await
    }

    pub async fn try_pool(&self) -> Option<Pool> {
        self.bank.try_load(&find_pool_pda().0).await
    }

    pub async fn custody_balance(&self) -> u64 {
        let custody = find_custody_pda(&find_pool_pda().0).0;
        self.bank.token_balance(&custody).await
    }
}
