use anyhow::Context as _;

use switchboard_app::{App, AppConfig};
use switchboard_products::NewProduct;
use switchboard_users::{NewUser, UserChanges};

fn main() -> anyhow::Result<()> {
    switchboard_observability::init();

    let config = AppConfig::from_env().context("reading configuration")?;
    let app = App::wire(&config);

    let alice = app
        .users()
        .create_user(
            &app.operation_context(),
            NewUser {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .context("creating user")?;

    for (name, price_cents) in [("Desk lamp", 2_499), ("Bookshelf", 8_900)] {
        app.products()
            .create_product(
                &app.operation_context(),
                NewProduct {
                    owner_id: alice.id(),
                    owner_name: alice.name().to_string(),
                    name: name.to_string(),
                    price_cents,
                },
            )
            .with_context(|| format!("creating product {name:?}"))?;
    }

    app.users()
        .update_user(
            &app.operation_context(),
            alice.id(),
            UserChanges {
                name: Some("Alice Liddell".to_string()),
                email: None,
            },
        )
        .context("renaming user")?;

    for product in app.products().list_by_owner(alice.id()) {
        tracing::info!(product = product.name(), owner = product.owner_name(), "owner name refreshed");
    }

    app.users()
        .delete_user(&app.operation_context(), alice.id())
        .context("deleting user")?;

    tracing::info!(
        remaining_products = app.products().list_products().len(),
        "user deleted"
    );

    for entry in app.activity().entries() {
        tracing::info!(topic = entry.topic, payload = %entry.payload, "activity");
    }

    Ok(())
}
