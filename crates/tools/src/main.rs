use std::env;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use foundation::geo::LngLat;
use foundation::ids::TokenSource;
use gateway::{
    GatewayConfig, ImageUpload, InMemoryGateway, ListOrder, RestGateway, Waypoint, WaypointGateway,
    WaypointId,
};
use map_view::{BasemapStyle, HeadlessRenderer, MapEvent, ViewEffect, WaypointMapView};
use runtime::event_bus::EventBus;
use screens::{AddWaypointForm, Notice, glyph_name};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Command-line client for the waypoints backend")]
struct Args {
    /// Backend base URL (default: $WAYPOINTS_URL)
    #[arg(long)]
    url: Option<String>,

    /// Anonymous API key (default: $WAYPOINTS_ANON_KEY)
    #[arg(long)]
    anon_key: Option<String>,

    /// Serve waypoints from a JSON file instead of the backend
    #[arg(long, conflicts_with_all = ["url", "anon_key"])]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List waypoints
    List {
        /// Most recently created first
        #[arg(long)]
        newest_first: bool,

        /// Case-insensitive filter over name, description and tags
        #[arg(long)]
        search: Option<String>,
    },

    /// Print the details of one waypoint
    Show { id: String },

    /// List the parameters that can be attached to a waypoint
    Params,

    /// Create a waypoint, uploading any images first
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        /// Stars, 1 to 5
        #[arg(long)]
        rating: Option<u8>,

        /// Parameter name; repeat for several
        #[arg(long = "param")]
        params: Vec<String>,

        /// Image file to upload; repeat for several
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    /// Run the map view headless and print the markers it places
    Preview {
        #[arg(long, default_value = "outdoors")]
        style: BasemapStyle,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let gateway = open_gateway(&args)?;
    let gateway = gateway.as_ref();

    match args.command {
        Command::List {
            newest_first,
            search,
        } => list(gateway, newest_first, search.as_deref()).await?,
        Command::Show { id } => show(gateway, &id).await?,
        Command::Params => params(gateway).await?,
        Command::Add {
            name,
            lat,
            lng,
            description,
            address,
            contact,
            rating,
            params,
            images,
        } => {
            let mut form = AddWaypointForm::new();
            form.name = name;
            form.description = description.unwrap_or_default();
            form.address = address.unwrap_or_default();
            form.contact_info = contact.unwrap_or_default();
            if let Some(stars) = rating {
                form.set_rating(stars)?;
            }
            for p in &params {
                form.toggle_parameter(p);
            }
            form.pick_location(LngLat::new(lng, lat));
            for path in &images {
                form.add_image(read_image(path).await?);
            }
            add(gateway, form).await?
        }
        Command::Preview { style } => preview(gateway, style).await,
    }

    Ok(())
}

fn open_gateway(args: &Args) -> Result<Box<dyn WaypointGateway>, Box<dyn std::error::Error>> {
    if let Some(path) = &args.fixture {
        let raw = std::fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
        let waypoints = load_fixture(&raw)?;
        info!(count = waypoints.len(), ?path, "serving waypoints from fixture");
        return Ok(Box::new(InMemoryGateway::with_waypoints(waypoints)));
    }
    let config = GatewayConfig::from_lookup(|key| match key {
        gateway::ENV_URL => args.url.clone().or_else(|| env::var(key).ok()),
        gateway::ENV_ANON_KEY => args.anon_key.clone().or_else(|| env::var(key).ok()),
        _ => env::var(key).ok(),
    })?;
    Ok(Box::new(RestGateway::new(config)))
}

fn load_fixture(raw: &str) -> Result<Vec<Waypoint>, serde_json::Error> {
    serde_json::from_str(raw)
}

async fn read_image(path: &Path) -> Result<ImageUpload, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("read {path:?}: {e}"))?;
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("invalid image filename: {path:?}"))?;
    Ok(ImageUpload::new(file_name, bytes))
}

async fn list(
    gateway: &dyn WaypointGateway,
    newest_first: bool,
    search: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let order = if newest_first {
        ListOrder::NewestFirst
    } else {
        ListOrder::Unspecified
    };
    let needle = search.unwrap_or_default().to_lowercase();
    for w in gateway.list_waypoints(order).await? {
        if screens::list::matches(&w, &needle) {
            println!("{}", summary_line(&w));
        }
    }
    Ok(())
}

fn summary_line(w: &Waypoint) -> String {
    format!(
        "{}\t{}\t{}\t{:.5},{:.5}",
        w.id,
        w.name,
        w.rating_label(),
        w.longitude,
        w.latitude
    )
}

async fn show(gateway: &dyn WaypointGateway, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id = WaypointId::new(id);
    let waypoints = gateway.list_waypoints(ListOrder::Unspecified).await?;
    let w = waypoints
        .into_iter()
        .find(|w| w.id == id)
        .ok_or_else(|| format!("no waypoint with id {id}"))?;
    print!("{}", detail_text(&w));
    Ok(())
}

fn detail_text(w: &Waypoint) -> String {
    let mut out = format!("{}\n★ {}", w.name, w.rating_label());
    if let Some(address) = w.address_text() {
        out.push_str(&format!(" • {address}"));
    }
    out.push('\n');
    if let Some(description) = w.description_text() {
        out.push_str(&format!("\n{description}\n"));
    }
    if let Some(contact) = w.contact_text() {
        out.push_str(&format!("contact: {contact}\n"));
    }
    if !w.parameters.is_empty() {
        out.push_str(&format!("tags: {}\n", w.parameters.join(", ")));
    }
    if w.images.is_empty() {
        out.push_str("images: none\n");
    } else {
        for url in &w.images {
            out.push_str(&format!("image: {url}\n"));
        }
    }
    out
}

async fn params(gateway: &dyn WaypointGateway) -> Result<(), Box<dyn std::error::Error>> {
    for p in gateway.list_parameters().await? {
        println!("{}\t{}\t{}", p.id, p.name, glyph_name(&p.icon));
    }
    Ok(())
}

async fn add(
    gateway: &dyn WaypointGateway,
    mut form: AddWaypointForm,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = form.submit(gateway).await;
    let notice = Notice::from_submit(&result);
    let stored = result?;
    println!("{}", notice.text());
    println!("{}", summary_line(&stored));
    Ok(())
}

async fn preview(gateway: &dyn WaypointGateway, style: BasemapStyle) {
    let mut tokens = TokenSource::new();
    let mut bus = EventBus::new();
    let renderer = HeadlessRenderer::default();
    let mut view = WaypointMapView::initialize(tokens.next_view(), Some(renderer), &mut bus);

    let outcome = view.refresh(gateway).await;
    info!(?outcome, "initial fetch");

    if style != view.style() {
        view.toggle_style();
        let loaded = view.renderer_mut().is_some_and(|r| r.finish_style_load());
        if loaded {
            bus.emit(view.token(), MapEvent::StyleLoaded);
        }
        for effect in view.pump(&mut bus) {
            if let ViewEffect::Fetch(request) = effect {
                let outcome = view.run_fetch(gateway, request).await;
                info!(?outcome, %style, "fetch after style change");
            }
        }
    }

    let Some(renderer) = view.renderer() else {
        warn!("preview has no renderer");
        return;
    };
    println!("style\t{}\t{}", renderer.style(), renderer.style().style_url());
    for marker in renderer.markers() {
        println!(
            "{}\t{:.5},{:.5}",
            marker.waypoint, marker.position.lng, marker.position.lat
        );
    }
    println!(
        "{} markers, {} cached waypoints",
        renderer.marker_count(),
        view.waypoints().len()
    );
    view.teardown(&mut bus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_add_with_repeated_flags() {
        let args = Args::try_parse_from([
            "waypoints", "add", "--name", "Sorgente", "--lat", "41.9", "--lng", "-0.5",
            "--param", "wifi", "--param", "water", "--rating", "4",
        ])
        .unwrap();
        match args.command {
            Command::Add {
                params, lng, rating, ..
            } => {
                assert_eq!(params, vec!["wifi".to_string(), "water".to_string()]);
                assert_eq!(lng, -0.5);
                assert_eq!(rating, Some(4));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn preview_style_parses() {
        let args =
            Args::try_parse_from(["waypoints", "preview", "--style", "satellite-streets"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Preview {
                style: BasemapStyle::SatelliteStreets
            }
        ));
        assert!(Args::try_parse_from(["waypoints", "preview", "--style", "streets"]).is_err());
    }

    #[test]
    fn fixture_conflicts_with_backend_flags() {
        let res = Args::try_parse_from([
            "waypoints", "--fixture", "w.json", "--url", "https://x", "params",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn fixture_tolerates_nulls() {
        let raw = r#"[{"id": 7, "name": "Rifugio", "latitude": 46.1, "longitude": 11.2,
            "rating": null, "parameters": null, "images": ["u1"]}]"#;
        let waypoints = load_fixture(raw).unwrap();
        assert_eq!(waypoints.len(), 1);
        assert_eq!(waypoints[0].id, WaypointId::new("7"));
        assert_eq!(summary_line(&waypoints[0]), "7\tRifugio\t0.0\t11.20000,46.10000");
    }

    #[test]
    fn detail_text_lists_images_or_none() {
        let mut w = Waypoint::new("a", "Colosseo", LngLat::new(12.49, 41.89));
        assert!(detail_text(&w).contains("images: none"));
        w.images = vec!["u1".into(), "u2".into()];
        w.address = Some("Roma".into());
        let text = detail_text(&w);
        assert!(text.starts_with("Colosseo\n★ 0.0 • Roma\n"));
        assert_eq!(text.matches("image: ").count(), 2);
    }
}
