use crate::core::{Block, Ledger};
use crate::LedgerError;
use console::{style, Emoji};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::fmt::Write;
use std::time::Duration;

static PICKAXE: Emoji<'_, '_> = Emoji("⛏️ ", "");
static CHAIN: Emoji<'_, '_> = Emoji("⛓️ ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️ ", "");

/// Amount the tamper action adds to the latest block's first transaction.
fn tamper_delta() -> Decimal {
    Decimal::new(99999, 2)
}

const MENU_ITEMS: &[&str] = &[
    "Add Transaction",
    "Mine Block",
    "Print Blockchain",
    "Validate Blockchain",
    "Check Balance",
    "List Wallets",
    "Chain Info",
    "Tamper With Latest Block (diagnostic)",
    "Exit",
];

pub struct MenuCli {
    ledger: Ledger,
}

impl MenuCli {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        println!("{}{}", CHAIN, style("Tallychain ledger").bold().cyan());

        loop {
            let choice = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Blockchain menu")
                .items(MENU_ITEMS)
                .default(0)
                .interact()?;

            match choice {
                0 => self.add_transaction()?,
                1 => self.mine_block()?,
                2 => self.print_chain(),
                3 => self.validate_chain(),
                4 => self.check_balance()?,
                5 => self.list_wallets(),
                6 => self.chain_info(),
                7 => self.tamper(),
                _ => {
                    println!("Exiting...");
                    return Ok(());
                }
            }
        }
    }

    fn add_transaction(&mut self) -> anyhow::Result<()> {
        let theme = ColorfulTheme::default();
        let sender: String = Input::with_theme(&theme).with_prompt("Enter sender").interact_text()?;
        let recipient: String = Input::with_theme(&theme)
            .with_prompt("Enter recipient")
            .interact_text()?;
        let amount: Decimal = Input::with_theme(&theme).with_prompt("Enter amount").interact_text()?;

        match self.ledger.propose_transaction(&sender, &recipient, amount) {
            Ok(tx) => println!("{}Transaction added: {}", CHECK, tx),
            Err(e) if e.is_rejection() => println!("{}{}", CROSS, describe_rejection(&e)),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn mine_block(&mut self) -> anyhow::Result<()> {
        let miner: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Enter miner address")
            .interact_text()?;

        let target = self.ledger.chain().miner().target();
        let estimate = self
            .ledger
            .last_mining_stats()
            .and_then(|stats| target.estimate_seconds(stats.hashrate()))
            .map(|secs| format!(", ~{:.1}s at the last measured rate", secs))
            .unwrap_or_default();
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] Mining block... {msg}")
        {
            pb.set_style(spinner_style);
        }
        pb.set_message(format!(
            "target prefix {:?}, ~{:.0} attempts expected{}",
            target.prefix(),
            target.expected_attempts(),
            estimate
        ));
        pb.enable_steady_tick(Duration::from_millis(100));

        let outcome = self.ledger.mine_pending(&miner).cloned();
        pb.finish_and_clear();

        match outcome {
            Ok(block) => {
                println!("{}{}Block #{} mined: {}", PICKAXE, CHECK, block.index(), style(block.digest()).green());
                if let Some(stats) = self.ledger.last_mining_stats() {
                    println!(
                        "Attempts: {}, time: {:.2}s, hashrate: {:.0} H/s",
                        stats.attempts,
                        stats.elapsed.as_secs_f64(),
                        stats.hashrate()
                    );
                }
            }
            Err(e) if e.is_rejection() => println!("{}{}", CROSS, describe_rejection(&e)),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn print_chain(&self) {
        println!("\n===== BLOCKCHAIN =====");
        for block in self.ledger.dump_chain() {
            println!("{}", render_block(block));
        }
        println!("======================");
    }

    fn validate_chain(&self) {
        match self.ledger.validate_chain() {
            Ok(()) => println!("{}{}", CHECK, style("Blockchain is valid!").green()),
            Err(violation) => {
                println!("{}{}", CROSS, style("Blockchain is invalid!").red());
                println!("  {} at block #{}", violation.kind, violation.index);
                println!("  Stored:   {}", violation.stored);
                println!("  Expected: {}", violation.expected);
            }
        }
    }

    fn check_balance(&self) -> anyhow::Result<()> {
        let address: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Enter wallet address")
            .interact_text()?;
        println!("Balance for {}: {}", address, style(self.ledger.balance_of(&address)).bold());
        Ok(())
    }

    fn list_wallets(&self) {
        println!("\nKnown Wallet Addresses:");
        for address in self.ledger.list_known_addresses() {
            println!(" - {}", address);
        }
    }

    fn chain_info(&self) {
        let info = self.ledger.chain_info();
        println!("Height:               {}", info.height);
        println!("Genesis:              {}", info.genesis);
        println!("Tip:                  {}", info.tip);
        println!("Difficulty:           {} ({})", info.difficulty, info.digest_algorithm);
        println!("Confirmed txs:        {}", info.total_transactions);
        match info.total_issued {
            Some(total) => println!("Total issued:         {}", total),
            None => println!("Total issued:         beyond the representable range"),
        }
        println!("Pending transactions: {}", info.pending_transactions);
    }

    fn tamper(&mut self) {
        match self.ledger.diagnostics().inflate_latest(tamper_delta()) {
            Some(index) => println!("{}Block #{} tampered successfully.", WARNING, index),
            None => println!("No tamperable block."),
        }
    }
}

fn describe_rejection(err: &LedgerError) -> String {
    match err {
        LedgerError::PoolFull { .. } => "Pending transaction limit reached".to_string(),
        LedgerError::InsufficientFunds { available, required } => format!(
            "Insufficient funds (Available after pending: {}, Required: {})",
            available, required
        ),
        other => other.to_string(),
    }
}

pub fn render_block(block: &Block) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Block #{}", block.index());
    let _ = writeln!(out, "Timestamp: {}", block.created_at());
    let _ = writeln!(out, "Previous Hash: {}", block.previous_digest());
    let _ = writeln!(out, "Hash: {}", block.digest());
    let _ = writeln!(out, "Nonce: {}", block.nonce());
    let _ = writeln!(out, "Transactions ({}):", block.transaction_count());
    for tx in block.transactions() {
        let _ = writeln!(out, "  {}", tx);
    }
    out
}
