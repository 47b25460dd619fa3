pub mod catalog;
pub mod dashboard;

use axum::Router;
use crate::state::AppState;
use crate::store::DocumentStore;

pub fn create_router<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .merge(catalog::routes())
        .merge(dashboard::routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExclusionList;
    use crate::models::product::Collection;
    use crate::store::memory::MemoryStore;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn get(path: &str) -> String {
        let store = MemoryStore::new().with(
            Collection::Bakery,
            vec![json!({
                "title": "all", "date": "2024-01-01T00:00:00Z",
                "price": 1.0, "pricePer100g": 0.5, "pricePerGram": 0.005
            })],
        );
        let app = create_router::<MemoryStore>().with_state(AppState::new(store, ExclusionList::default()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn dashboard_all_is_the_full_listing() {
        let response = get("/dashboard/all").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains(r#""title":"all""#));
    }

    #[tokio::test]
    async fn uppercase_all_does_not_reach_the_product_titled_all() {
        let response = get("/dashboard/ALL").await;
        assert!(response.starts_with("HTTP/1.1 404"), "{response}");
        assert!(!response.contains(r#""title":"all""#), "{response}");
    }

    #[tokio::test]
    async fn unknown_details_is_404_json() {
        let response = get("/details/caviar").await;
        assert!(response.starts_with("HTTP/1.1 404"), "{response}");
        assert!(response.contains(r#"{"error":"Document not found"}"#));
    }

    #[tokio::test]
    async fn encoded_titles_are_decoded() {
        let response = get("/dashboard/ALL%20").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.ends_with("[]"), "{response}");
    }
}
