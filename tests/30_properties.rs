mod common;

use anyhow::Result;
use common::{created_id, location, TestServer};
use reqwest::StatusCode;

async fn create_property(server: &TestServer, session: &str, form: &[(&str, &str)]) -> Result<i64> {
    let res = server.post_form("/properties", Some(session), form).await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    Ok(created_id(&res).expect("redirect to the new property"))
}

fn listed(page: &str, id: i64) -> bool {
    page.contains(&format!("<a href=\"/properties/{id}\">{id}</a>"))
}

#[tokio::test]
async fn villa_12_on_the_palm() -> Result<()> {
    let server = TestServer::start().await?;
    let session = server.login_admin().await?;

    let villa = create_property(
        &server,
        &session,
        &[("name", "Villa 12"), ("address", "Palm Jumeirah"), ("status", "vacant")],
    )
    .await?;

    let search = server.get("/properties?q=Palm", Some(&session)).await?.text().await?;
    assert!(listed(&search, villa));

    let occupied = server.get("/properties?status=occupied", Some(&session)).await?.text().await?;
    assert!(!listed(&occupied, villa));

    let res = server
        .post_form(
            &format!("/properties/{villa}"),
            Some(&session),
            &[("name", "Villa 12"), ("address", "Palm Jumeirah"), ("status", "occupied")],
        )
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some(format!("/properties/{villa}")));

    let vacant = server.get("/properties?status=vacant", Some(&session)).await?.text().await?;
    assert!(!listed(&vacant, villa));
    let occupied = server.get("/properties?status=occupied", Some(&session)).await?.text().await?;
    assert!(listed(&occupied, villa));
    Ok(())
}

#[tokio::test]
async fn create_then_show_applies_defaults() -> Result<()> {
    let server = TestServer::start().await?;
    let session = server.login_admin().await?;

    let id = create_property(
        &server,
        &session,
        &[("name", "Studio <4>"), ("bedrooms", "1"), ("furnished", "on"), ("price", "1200.50")],
    )
    .await?;

    let res = server.get(&format!("/properties/{id}"), Some(&session)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let page = res.text().await?;
    assert!(page.contains("Property created."));
    assert!(page.contains("Studio &lt;4&gt;"));
    assert!(page.contains("<dd>vacant</dd>"), "status defaults to vacant");
    assert!(page.contains("<dd>1200.5</dd>"));
    assert!(page.contains("<dd>Yes</dd>"));

    // Flashes are shown once
    let again = server.get(&format!("/properties/{id}"), Some(&session)).await?.text().await?;
    assert!(!again.contains("Property created."));
    Ok(())
}

#[tokio::test]
async fn invalid_input_rerenders_the_form() -> Result<()> {
    let server = TestServer::start().await?;
    let session = server.login_admin().await?;

    let missing = server
        .post_form("/properties", Some(&session), &[("name", "  "), ("address", "Marina")])
        .await?;
    assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = missing.text().await?;
    assert!(body.contains("Missing required field: name"));
    assert!(body.contains("value=\"Marina\""));

    let bad_status = server
        .post_form("/properties", Some(&session), &[("name", "X"), ("status", "sold")])
        .await?;
    assert_eq!(bad_status.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bad_number = server
        .post_form("/properties", Some(&session), &[("name", "X"), ("bedrooms", "many")])
        .await?;
    assert_eq!(bad_number.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let listing = server.get("/properties", Some(&session)).await?.text().await?;
    assert!(listing.contains("No properties found."));
    Ok(())
}

#[tokio::test]
async fn filters_combine_and_treat_wildcards_literally() -> Result<()> {
    let server = TestServer::start().await?;
    let session = server.login_admin().await?;

    let palm_vacant = create_property(&server, &session, &[("name", "Palm Villa"), ("status", "vacant")]).await?;
    let palm_occupied = create_property(
        &server,
        &session,
        &[("name", "Tower"), ("address", "Palm Jumeirah"), ("status", "occupied")],
    )
    .await?;
    let other = create_property(&server, &session, &[("name", "100% Loft"), ("status", "occupied")]).await?;

    let both = server
        .get("/properties?q=palm&status=occupied", Some(&session))
        .await?
        .text()
        .await?;
    assert!(listed(&both, palm_occupied));
    assert!(!listed(&both, palm_vacant));
    assert!(!listed(&both, other));

    // Empty parameters add no predicate
    let all = server.get("/properties?q=&status=", Some(&session)).await?.text().await?;
    assert!([palm_vacant, palm_occupied, other].iter().all(|id| listed(&all, *id)));

    let percent = server.get("/properties?q=%25", Some(&session)).await?.text().await?;
    assert!(listed(&percent, other));
    assert!(!listed(&percent, palm_vacant));
    Ok(())
}

#[tokio::test]
async fn delete_then_missing_record_redirects_with_notice() -> Result<()> {
    let server = TestServer::start().await?;
    let session = server.login_admin().await?;
    let id = create_property(&server, &session, &[("name", "Short lived")]).await?;

    let res = server.post_form(&format!("/properties/{id}/delete"), Some(&session), &[]).await?;
    assert_eq!(location(&res).as_deref(), Some("/properties"));
    let listing = server.get("/properties", Some(&session)).await?.text().await?;
    assert!(listing.contains("Property deleted."));
    assert!(!listed(&listing, id));

    let gone = server.get(&format!("/properties/{id}"), Some(&session)).await?;
    assert_eq!(gone.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&gone).as_deref(), Some("/properties"));
    let notice = server.get("/properties", Some(&session)).await?.text().await?;
    assert!(notice.contains("Property not found."));
    Ok(())
}

#[tokio::test]
async fn malformed_ids_are_treated_as_missing_records() -> Result<()> {
    let server = TestServer::start().await?;
    let session = server.login_admin().await?;

    for path in ["/properties/abc", "/properties/abc/edit", "/properties/-3"] {
        let res = server.get(path, Some(&session)).await?;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(location(&res).as_deref(), Some("/properties"), "{}", path);
    }
    for path in ["/properties/abc", "/properties/abc/delete"] {
        let res = server.post_form(path, Some(&session), &[("name", "X")]).await?;
        assert_eq!(location(&res).as_deref(), Some("/properties"), "{}", path);
    }

    let notice = server.get("/properties", Some(&session)).await?.text().await?;
    assert!(notice.contains("Property not found."));
    Ok(())
}

#[tokio::test]
async fn rejected_edit_keeps_the_edit_title() -> Result<()> {
    let server = TestServer::start().await?;
    let session = server.login_admin().await?;
    let id = create_property(&server, &session, &[("name", "Marina Flat")]).await?;

    let res = server
        .post_form(&format!("/properties/{id}"), Some(&session), &[("name", ""), ("status", "vacant")])
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.text().await?;
    assert!(body.contains("<h1>Edit property</h1>"));
    assert!(body.contains(&format!("action=\"/properties/{id}\"")));
    Ok(())
}
