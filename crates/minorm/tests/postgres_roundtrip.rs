//! End-to-end scenarios against a live PostgreSQL.
//!
//! Skipped unless `DATABASE_URL` is set (a `.env` file is honoured).

use minorm::{Database, DatabaseConfig, Executor, Filter, Model, OrmResult, Record};

#[derive(Debug, Clone, Default, PartialEq, Model)]
#[orm(table = "minorm_rt_items", display = "name")]
struct Item {
    id: Option<i64>,
    #[orm(blank = false)]
    list_id: Option<i64>,
    #[orm(blank = false)]
    name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Model)]
#[orm(table = "minorm_rt_tasks", display = "name")]
struct Task {
    id: Option<i64>,
    list_id: Option<i64>,
    name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Model)]
#[orm(table = "minorm_rt_todos", display = "name")]
struct Todo {
    id: Option<i64>,
    list_id: Option<i64>,
    name: Option<String>,
}

async fn try_connect() -> Option<Database> {
    dotenvy::dotenv().ok();
    let config = DatabaseConfig::from_env().ok()?;
    Some(
        Database::connect(config)
            .await
            .expect("Failed to connect to DATABASE_URL"),
    )
}

async fn reset_table(db: &Database, table: &str) -> OrmResult<()> {
    db.execute(&format!("DROP TABLE IF EXISTS {table}")).await?;
    db.execute(&format!(
        "CREATE TABLE {table} (id BIGSERIAL PRIMARY KEY, list_id BIGINT, name VARCHAR(200))"
    ))
    .await?;
    Ok(())
}

fn item(list_id: i64, name: &str) -> Item {
    Item {
        id: None,
        list_id: Some(list_id),
        name: Some(name.to_string()),
    }
}

#[tokio::test]
async fn create_get_update_delete() -> OrmResult<()> {
    let Some(db) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return Ok(());
    };
    assert!(db.is_connected());
    reset_table(&db, Item::TABLE).await?;

    let objects = Item::objects();
    let saved = objects.create(&db, item(1, "Milk")).await?;
    let id = saved.id.expect("saved instance has an id");

    let fetched = objects.get(&db, [Filter::eq("id", id)]).await?;
    assert_eq!(fetched, saved);

    // get_or_create hands back the stored row untouched
    let again = objects
        .get_or_create(
            &db,
            Item {
                id: Some(id),
                ..item(9, "Other")
            },
        )
        .await?;
    assert_eq!(again, saved);
    assert_eq!(objects.count(&db).await?, 1);

    let updated = objects
        .update_from_json(
            &db,
            &format!(r#"{{"id": {id}, "list_id": 1, "name": "Oat milk"}}"#),
        )
        .await?;
    assert_eq!(updated.name.as_deref(), Some("Oat milk"));
    let reread = objects.get(&db, [Filter::eq("id", id)]).await?;
    assert_eq!(reread.name.as_deref(), Some("Oat milk"));

    let missing = objects.get(&db, [Filter::eq("id", id + 100)]).await;
    assert!(missing.unwrap_err().is_not_found());

    reread.delete(&db).await?;
    assert_eq!(objects.count(&db).await?, 0);

    db.close().await
}

#[tokio::test]
async fn filters_ordering_slices_and_json() -> OrmResult<()> {
    let Some(db) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return Ok(());
    };
    reset_table(&db, Task::TABLE).await?;

    let objects = Task::objects();
    for (list_id, name) in [(1, "a"), (1, "b"), (2, "c"), (2, "d"), (2, "e")] {
        objects
            .create_from_record(&db, &Record::new().set("list_id", list_id).set("name", name))
            .await?;
    }

    let second_list = objects.filter(Filter::eq("list_id", 2));
    assert_eq!(second_list.count(&db).await?, 3);

    let newest = second_list.clone().order_by("-id").fetch(&db).await?;
    let names: Vec<_> = newest.iter().filter_map(|t| t.name.clone()).collect();
    assert_eq!(names, vec!["e", "d", "c"]);

    let first_two = objects.all().order_by("id").limit(2).fetch(&db).await?;
    assert_eq!(first_two.len(), 2);

    let page = objects.all().order_by("id").slice(1..3).fetch(&db).await?;
    let names: Vec<_> = page.iter().filter_map(|t| t.name.clone()).collect();
    assert_eq!(names, vec!["b", "c"]);

    let later = objects.all().gt("id", first_two[1].id.unwrap_or_default()).len(&db).await?;
    assert_eq!(later, 3);

    let raw = second_list.clone().order_by("id").json(&db).await?;
    let decoded: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    let rebuilt: Vec<Task> = decoded
        .iter()
        .map(|v| Task::from_json(&v.to_string()))
        .collect::<OrmResult<_>>()?;
    assert_eq!(rebuilt, second_list.clone().order_by("id").fetch(&db).await?);

    let renamed = second_list
        .update(&db, &Record::new().set("name", "done"))
        .await?;
    assert_eq!(renamed, 3);
    assert_eq!(
        objects.filter(Filter::eq("name", "done")).count(&db).await?,
        3
    );

    let removed = objects.delete(&db, [Filter::eq("list_id", 1)]).await?;
    assert_eq!(removed, 2);
    assert_eq!(objects.count(&db).await?, 3);

    let raw_rows = objects
        .execute_query(&db, &format!("{} WHERE name = 'done'", Task::simple_query()))
        .await?;
    assert_eq!(raw_rows.len(), 3);

    db.close().await
}

fn ids<M: Model>(rows: &[M]) -> Vec<i64> {
    rows.iter().filter_map(Model::id).collect()
}

#[tokio::test]
async fn seeded_lists_filter_slice_and_full_row_update() -> OrmResult<()> {
    let Some(db) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return Ok(());
    };
    reset_table(&db, Todo::TABLE).await?;

    let objects = Todo::objects();
    let seed = [
        (1, "Read a book"),
        (2, "Buy milk"),
        (2, "Walk the dog"),
        (1, "Write letters"),
    ];
    for (list_id, name) in seed {
        objects
            .create_from_record(&db, &Record::new().set("list_id", list_id).set("name", name))
            .await?;
    }

    let newest_second = objects
        .filter(Filter::eq("list_id", 2))
        .order_by("-id")
        .fetch(&db)
        .await?;
    assert_eq!(ids(&newest_second), vec![3, 2]);

    let tail = objects.all().order_by("id").slice(2..4).fetch(&db).await?;
    assert_eq!(ids(&tail), vec![3, 4]);

    let mut first = objects.get(&db, [Filter::eq("id", 1)]).await?;
    first.name = Some("Read two books".to_string());
    assert_eq!(first.update(&db).await?, 1);

    let reread = objects.get(&db, [Filter::eq("id", 1)]).await?;
    assert_eq!(reread.name.as_deref(), Some("Read two books"));
    assert_eq!(reread.list_id, Some(1));
    assert_eq!(objects.filter(Filter::eq("list_id", 1)).count(&db).await?, 2);

    db.close().await
}
