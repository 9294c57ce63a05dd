use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use powchain_core::peers::PeerClient;
use powchain_core::signature::{SignedTransfer, Submission, TransferRequest};
use powchain_core::wire::{
    AmountResponse, ChainResponse, ConsensusResponse, HeadResponse, MessageResponse,
    MineResponse, SubmitResponse, TransactionsResponse,
};
use powchain_core::{Blockchain, MINING_SENDER};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

type Node<C> = State<Arc<Blockchain<C>>>;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
struct AmountQuery {
    address: String,
}

fn reply(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(MessageResponse::new(message))).into_response()
}

/// Parse a wire transfer. Anything claiming the reward sender is refused.
fn parse_transfer(req: TransferRequest) -> Result<SignedTransfer, Response> {
    if req.sender == MINING_SENDER {
        warn!("transfer claiming the reward sender refused");
        return Err(reply(StatusCode::BAD_REQUEST, "fail"));
    }
    SignedTransfer::try_from(req).map_err(|err| {
        warn!(error = %err, "malformed transfer");
        reply(StatusCode::BAD_REQUEST, "fail")
    })
}

pub fn router<C: PeerClient + 'static>(chain: Arc<Blockchain<C>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/chain", get(get_chain::<C>))
        .route("/chain/head", get(chain_head::<C>))
        .route(
            "/transactions",
            get(list_transactions::<C>)
                .post(submit_transaction::<C>)
                .put(relay_transaction::<C>)
                .delete(clear_transactions::<C>),
        )
        .route("/consensus", put(consensus::<C>))
        .route("/mine", get(mine::<C>))
        .route("/amount", get(amount::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(chain)
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn get_chain<C: PeerClient + 'static>(State(chain): Node<C>) -> Json<ChainResponse> {
    Json(ChainResponse {
        chain: chain.chain().await,
    })
}

async fn chain_head<C: PeerClient + 'static>(State(chain): Node<C>) -> Json<HeadResponse> {
    let (height, hash) = chain.head().await;
    Json(HeadResponse {
        height,
        hash: hex::encode(hash),
    })
}

async fn list_transactions<C: PeerClient + 'static>(
    State(chain): Node<C>,
) -> Json<TransactionsResponse> {
    let transactions = chain.transactions().await;
    Json(TransactionsResponse {
        length: transactions.len(),
        transactions,
    })
}

/// Client submission: verify, pool, relay.
async fn submit_transaction<C: PeerClient + 'static>(
    State(chain): Node<C>,
    Json(req): Json<TransferRequest>,
) -> Response {
    let transfer = match parse_transfer(req) {
        Ok(transfer) => transfer,
        Err(res) => return res,
    };
    match chain.create_transaction(transfer).await {
        Some(report) => (
            StatusCode::CREATED,
            Json(SubmitResponse {
                message: "success".into(),
                relayed: report.delivered.len(),
                relay_failures: report.failed.len(),
            }),
        )
            .into_response(),
        None => reply(StatusCode::BAD_REQUEST, "fail"),
    }
}

/// Peer relay: verify and pool only.
async fn relay_transaction<C: PeerClient + 'static>(
    State(chain): Node<C>,
    Json(req): Json<TransferRequest>,
) -> Response {
    let transfer = match parse_transfer(req) {
        Ok(transfer) => transfer,
        Err(res) => return res,
    };
    if chain.add_transaction(Submission::Transfer(transfer)).await {
        reply(StatusCode::OK, "success")
    } else {
        reply(StatusCode::BAD_REQUEST, "fail")
    }
}

async fn clear_transactions<C: PeerClient + 'static>(State(chain): Node<C>) -> Response {
    chain.clear_transactions().await;
    reply(StatusCode::OK, "success")
}

async fn consensus<C: PeerClient + 'static>(State(chain): Node<C>) -> Json<ConsensusResponse> {
    Json(ConsensusResponse {
        replaced: chain.resolve_conflicts().await,
    })
}

async fn mine<C: PeerClient + 'static>(State(chain): Node<C>) -> Response {
    match chain.mine().await {
        Ok(mined) => Json(MineResponse {
            height: mined.height,
            hash: hex::encode(mined.block.hash()),
            notified: mined.notified.delivered.len(),
            failed: mined.notified.failed.len(),
        })
        .into_response(),
        Err(err) => {
            error!(error = %err, "on-demand mining failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, "fail")
        }
    }
}

async fn amount<C: PeerClient + 'static>(
    State(chain): Node<C>,
    Query(query): Query<AmountQuery>,
) -> Json<AmountResponse> {
    Json(AmountResponse {
        amount: chain.total_amount(&query.address).await,
    })
}
