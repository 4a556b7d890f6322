diesel::table! {
    game_states (id) {
        id -> Integer,
        fen -> Text,
        last_move -> Text,
        last_player -> Text,
        move_history -> Text,
        game_outcome -> Nullable<Text>,
        created_at -> Timestamp,
    }
}
