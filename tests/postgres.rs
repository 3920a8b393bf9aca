//! Repository queries against a real database. Run with
//! `DATABASE_URL=... cargo test -- --ignored`.

use sqlx::PgPool;
use time::macros::date;
use uuid::Uuid;

use devportal::application::filters::{ListingQuery, MalformedDatePolicy, build_event_filter};
use devportal::application::pagination::PageWindow;
use devportal::application::repos::{EventsRepo, ListingPagesRepo, RepoError, TopicsRepo};
use devportal::domain::body::BodyBlock;
use devportal::domain::predicate::Predicate;
use devportal::infra::db::PostgresRepositories;

async fn seed(pool: &PgPool) {
    let css = Uuid::new_v4();
    sqlx::query("INSERT INTO topics (id, slug, title, status) VALUES ($1, 'css', 'CSS', 'published')")
        .bind(css)
        .execute(pool)
        .await
        .expect("topic");

    let rows = [
        ("feb-01", date!(2020 - 02 - 01), "DE", "published"),
        ("mar-19", date!(2020 - 03 - 19), "DE", "published"),
        ("apr-01", date!(2020 - 04 - 01), "FR", "published"),
        ("apr-02", date!(2020 - 04 - 02), "", "draft"),
    ];
    for (slug, start, country, status) in rows {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO events (id, slug, title, status, start_date, country, speakers, body) \
             VALUES ($1, $2, $2, $3::page_status, $4, $5, \
             '[{\"type\":\"person\",\"title\":\"Ada\"},{\"type\":\"speaker\",\"value\":3}]', \
             '[{\"type\":\"paragraph\",\"html\":\"<p>Talks</p>\"},{\"type\":\"raw_html\"}]')",
        )
        .bind(id)
        .bind(slug)
        .bind(status)
        .bind(start)
        .bind(country)
        .execute(pool)
        .await
        .expect("event");

        if slug == "mar-19" {
            sqlx::query("INSERT INTO event_topics (event_id, topic_id) VALUES ($1, $2)")
                .bind(id)
                .bind(css)
                .execute(pool)
                .await
                .expect("event topic");
        }
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn filtered_listing_matches_in_database(pool: PgPool) {
    seed(&pool).await;
    let repos = PostgresRepositories::new(pool);
    let cutoff = date!(2020 - 03 - 10);

    let query = ListingQuery::parse("date=2020-03&date=past&topic=css&country=de");
    let filter = build_event_filter(&query, cutoff, MalformedDatePolicy::DiscardAll);
    let window = PageWindow {
        offset: 0,
        limit: 8,
    };

    // feb-01 is past and in DE but lacks the topic.
    let events = repos
        .list_events(&filter.predicate, window)
        .await
        .expect("list events");
    let slugs: Vec<&str> = events.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["mar-19"]);
    assert_eq!(events[0].topics[0].slug, "css");
    assert!(events[0].speakers.is_empty() && events[0].body.is_empty());

    // Unknown block types are dropped; the rest of the row still loads.
    let detail = repos
        .find_by_slug("mar-19")
        .await
        .expect("lookup")
        .expect("published event");
    assert!(detail.has_speaker("Ada"));
    assert_eq!(detail.speakers.len(), 1);
    assert_eq!(
        detail.body,
        vec![BodyBlock::Paragraph {
            html: "<p>Talks</p>".to_string()
        }]
    );

    let upcoming = Predicate::StartOnOrAfter(cutoff);
    assert_eq!(repos.count_events(&upcoming).await.expect("count"), 2);
    assert_eq!(
        repos.list_start_dates(&upcoming).await.expect("dates"),
        vec![date!(2020 - 03 - 19), date!(2020 - 04 - 01)]
    );

    let countries: Vec<String> = repos
        .list_countries()
        .await
        .expect("countries")
        .iter()
        .map(|code| code.as_str().to_string())
        .collect();
    assert_eq!(countries, vec!["DE", "FR"]);

    assert_eq!(repos.list_topics().await.expect("topics").len(), 1);
    assert!(repos.find_by_slug("apr-02").await.expect("lookup").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn second_listing_page_hits_the_singleton_index(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let params = devportal::application::repos::CreateListingParams {
        slug: "events".to_string(),
        title: "Events".to_string(),
        seo_title: String::new(),
        search_description: String::new(),
        featured: Vec::new(),
        body: vec![BodyBlock::Paragraph {
            html: "<p>Find us at meetups.</p>".to_string(),
        }],
        keywords: vec!["meetups".to_string()],
        show_in_menus: true,
    };

    let created = repos
        .create_listing(params.clone())
        .await
        .expect("first listing page");
    assert!(repos.listing_exists().await.expect("exists"));
    let loaded = repos
        .load_listing()
        .await
        .expect("load")
        .expect("listing page");
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.body, created.body);

    let mut second = params;
    second.slug = "more-events".to_string();
    let err = repos
        .create_listing(second)
        .await
        .expect_err("second listing page");
    assert!(matches!(err, RepoError::Duplicate { .. }));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_featured_entry_does_not_break_listing(pool: PgPool) {
    sqlx::query(
        "INSERT INTO events_listing_pages (id, slug, title, featured) VALUES ($1, 'events', 'Events', \
         '[{\"type\":\"external_event\",\"id\":9},{\"type\":\"event\",\"slug\":\"devconf\"}]')",
    )
    .bind(Uuid::new_v4())
    .execute(&pool)
    .await
    .expect("listing page");

    let repos = PostgresRepositories::new(pool);
    let page = repos
        .load_listing()
        .await
        .expect("load")
        .expect("listing page");
    assert_eq!(
        page.featured,
        vec![devportal::domain::listing::FeaturedItem::Event {
            slug: "devconf".to_string()
        }]
    );
}
