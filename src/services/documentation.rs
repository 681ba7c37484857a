use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Chicken game backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::list_rooms,
        crate::routes::rooms::get_room_status,
        crate::routes::rooms::delete_room,
        crate::routes::rooms::get_room_state,
        crate::routes::rooms::start_game,
        crate::routes::rooms::next_round,
        crate::routes::rooms::end_game,
        crate::routes::rooms::get_game_summary,
        crate::routes::players::join_room,
        crate::routes::rounds::get_current_round,
        crate::routes::rounds::get_pair,
        crate::routes::rounds::submit_action,
        crate::routes::rounds::publish_round,
        crate::routes::rounds::skip_round,
        crate::routes::rounds::get_round_result,
        crate::routes::rounds::send_message,
        crate::routes::rounds::get_message,
        crate::routes::rounds::assign_indicators,
        crate::routes::rounds::get_indicator,
    ),
    components(
        schemas(
            crate::dao::models::RoomStatus,
            crate::dao::models::RoundStatus,
            crate::dao::models::RoundPhase,
            crate::dao::models::Choice,
            crate::dto::health::HealthResponse,
            crate::dto::common::OkResponse,
            crate::dto::room::RoomCreatedResponse,
            crate::dto::room::RoomStatusResponse,
            crate::dto::room::RoomListItem,
            crate::dto::room::RoomListResponse,
            crate::dto::room::RoomDeletedResponse,
            crate::dto::room::JoinRoomRequest,
            crate::dto::room::PlayerJoinedResponse,
            crate::dto::room::RoundStartedResponse,
            crate::dto::room::PlayerSummary,
            crate::dto::room::GameStats,
            crate::dto::room::GameSummaryResponse,
            crate::dto::round::RoundCurrentResponse,
            crate::dto::round::PairResponse,
            crate::dto::round::SubmitActionRequest,
            crate::dto::round::RoundResultResponse,
            crate::dto::round::SendMessageRequest,
            crate::dto::round::MessageResponse,
            crate::dto::round::IndicatorResponse,
            crate::dto::state::RoomStateResponse,
            crate::dto::state::RoomStatePayload,
            crate::dto::state::RoundStatePayload,
            crate::dto::state::PlayerStatePayload,
            crate::dto::state::PlayerSubmissionStatus,
            crate::dto::state::MessageStatePayload,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Room lifecycle and polling snapshot"),
        (name = "players", description = "Player membership"),
        (name = "rounds", description = "Round play, messages and indicators"),
    )
)]
pub struct ApiDoc;
