//! Chain node demo binary
//!
//! Seeds a chain from the configured genesis balances, seals a batch of
//! generated transfers into blocks, re-validates the result, then plays a
//! second node proposing one more block.

use anyhow::Context;
use chain_core::{
    actor::spawn_node_actor, check_chain, make_block, Config, Metrics, Node,
    TransactionGenerator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match std::env::var("CHAIN_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => Config::from_env()?,
    };

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting chain node"
    );

    let node = Node::from_genesis(config.genesis_allocation())?;
    let metrics = Metrics::new()?;
    let handle = spawn_node_actor(node, &config.assembly, metrics.clone());

    // Local producer: generate, buffer, seal
    let mut generator = TransactionGenerator::new(
        config.generator.seed,
        config.generator_accounts(),
        config.generator.max_value,
    )?;
    for txn in generator.batch(config.generator.count) {
        handle.submit_transaction(txn).await?;
    }
    while handle.seal_block().await?.is_some() {}

    let chain = handle.get_chain().await?;
    let state = handle.get_state().await?;
    tracing::info!(height = chain.len(), %state, "Local blocks sealed");

    // Re-validate from both structured and serialized forms
    let replayed = check_chain(&chain).context("structured chain failed validation")?;
    let json = chain.to_json()?;
    let reparsed = check_chain(&json).context("serialized chain failed validation")?;
    anyhow::ensure!(
        replayed == state && reparsed == state,
        "replayed state diverges from node state"
    );
    tracing::info!(bytes = json.len(), "Chain re-validated");

    // Second node proposes a block on top of the same chain
    let proposal = make_block(generator.batch(config.assembly.max_txns_per_block), chain.tip())?;
    tracing::info!(
        height = handle.get_height().await?,
        "New block received; checking validity"
    );
    let outcome = handle.submit_block(proposal).await?;
    if outcome.is_accepted() {
        tracing::info!("Block accepted");
    } else {
        tracing::warn!(?outcome, "Invalid block; waiting for the next block");
    }
    tracing::info!(height = handle.get_height().await?, "Chain height after proposal");

    handle.shutdown().await?;
    print!("{}", metrics.render()?);
    Ok(())
}
