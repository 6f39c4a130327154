// HTTP handler bindings for the agent API endpoints
//
// Thin wrappers binding Rocket routes to the Bot's methods. Handlers
// deserialize requests, pull the Bot from managed state, delegate and
// serialize the reply.

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Build, Rocket};
use serde_json::{json, Value};

use crate::bot::Bot;
use crate::types::MoveRequest;

/// GET / endpoint
/// Returns agent metadata
#[get("/")]
pub fn index(bot: &rocket::State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start endpoint
#[post("/start", format = "json", data = "<start_req>")]
pub fn start(bot: &rocket::State<Bot>, start_req: Json<MoveRequest>) -> Status {
    bot.start(&start_req.game, start_req.turn, &start_req.board);

    Status::Ok
}

/// POST /move endpoint
/// Called each turn to compute and return the next move.
/// Malformed boards and finished games answer 422 with an error message.
#[post("/move", format = "json", data = "<move_req>")]
pub async fn get_move(
    bot: &rocket::State<Bot>,
    move_req: Json<MoveRequest>,
) -> Result<Json<Value>, status::Custom<Json<Value>>> {
    bot.get_move(&move_req.game, move_req.turn, &move_req.board)
        .await
        .map(Json)
        .map_err(|e| {
            log::warn!("Rejected move request: {}", e);
            status::Custom(Status::UnprocessableEntity, Json(json!({ "error": e })))
        })
}

/// POST /end endpoint
#[post("/end", format = "json", data = "<end_req>")]
pub fn end(bot: &rocket::State<Bot>, end_req: Json<MoveRequest>) -> Status {
    bot.end(&end_req.game, end_req.turn, &end_req.board);

    Status::Ok
}

/// Mounts every endpoint on a fresh Rocket instance managing `bot`
pub fn mount(bot: Bot) -> Rocket<Build> {
    rocket::build()
        .manage(bot)
        .mount("/", routes![index, start, get_move, end])
}
