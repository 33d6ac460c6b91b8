pub async fn init_env() {
    // Missing `.env` is fine; values may come from the real environment.
    dotenvy::dotenv().ok();
}
