use super::*;

#[test]
fn credits_with_missing_optional_fields() {
    let json = r#"{
        "id": 603,
        "cast": [
            {"id": 6384, "name": "Keanu Reeves", "character": "Neo", "profile_path": "/abc.jpg"},
            {"id": 2975, "name": "Laurence Fishburne"}
        ]
    }"#;
    let credits: CreditsResponse = serde_json::from_str(json).unwrap();
    assert_eq!(credits.cast.len(), 2);
    assert_eq!(credits.cast[0].character, "Neo");
    assert_eq!(credits.cast[1].character, "");
    assert_eq!(credits.cast[1].profile_path, None);
}

#[test]
fn credits_without_cast_section() {
    let credits: CreditsResponse = serde_json::from_str(r#"{"id": 1}"#).unwrap();
    assert!(credits.cast.is_empty());
}

#[test]
fn providers_with_partial_offers() {
    let json = r#"{
        "id": 603,
        "results": {
            "FR": {
                "link": "https://www.themoviedb.org/movie/603/watch?locale=FR",
                "flatrate": [{"provider_id": 8, "provider_name": "Netflix"}]
            },
            "US": {}
        }
    }"#;
    let resp: WatchProvidersResponse = serde_json::from_str(json).unwrap();
    let fr = &resp.results["FR"];
    assert_eq!(fr.flatrate[0].provider_name, "Netflix");
    assert!(fr.rent.is_empty());
    assert!(fr.buy.is_empty());
    let us = &resp.results["US"];
    assert!(us.link.is_none());
    assert!(us.flatrate.is_empty());
}

#[test]
fn providers_without_results() {
    let resp: WatchProvidersResponse = serde_json::from_str(r#"{"id": 1}"#).unwrap();
    assert!(resp.results.is_empty());
}

#[test]
fn popular_page_keeps_raw_documents() {
    let json = r#"{
        "page": 1,
        "total_pages": 2,
        "results": [{"id": 603, "title": "The Matrix", "vote_average": 8.2}]
    }"#;
    let page: MoviePage = serde_json::from_str(json).unwrap();
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.results[0]["vote_average"], 8.2);
}
