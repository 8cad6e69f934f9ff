//! Line-oriented front end over [`SearchPage`].

use std::fmt::Write as _;

use tokio::io::{AsyncBufRead, AsyncWriteExt, Lines};

use crate::domain::sort::SortSpec;
use crate::domain::types::DogId;
use crate::pagination::PageWindow;
use crate::repository::{DogReader, LocationReader, MatchWriter, SessionWriter};
use crate::services::filters::NearbyState;
use crate::services::geolocation::Geolocator;
use crate::services::notifications::NotificationLog;
use crate::services::orchestrator::SearchPage;

pub const HELP: &str = "\
commands:
  show                   current filters and results
  breeds <text>          suggest breeds containing <text>
  add <breed>            select a breed
  remove <breed>         deselect a breed
  age-min <n> | age-max <n>
  sort <field:dir>       breed|name|age : asc|desc
  nearby                 toggle dogs near me
  search                 run the search with current filters
  reset                  clear filters and search again
  page <n> | next | prev
  fav <dog id>           toggle a favorite
  favs | clear-favs
  match | close
  quit";

/// Parsed shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Show,
    Breeds(String),
    Add(String),
    Remove(String),
    AgeMin(String),
    AgeMax(String),
    Sort(SortSpec),
    Nearby,
    Search,
    Reset,
    Page(usize),
    Next,
    Prev,
    Favorite(DogId),
    Favorites,
    ClearFavorites,
    Match,
    Close,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let command = match name {
            "help" | "?" => Command::Help,
            "show" | "" => Command::Show,
            "breeds" => Command::Breeds(arg.to_string()),
            "add" if !arg.is_empty() => Command::Add(arg.to_string()),
            "remove" if !arg.is_empty() => Command::Remove(arg.to_string()),
            "age-min" => Command::AgeMin(arg.to_string()),
            "age-max" => Command::AgeMax(arg.to_string()),
            "sort" => Command::Sort(arg.parse().map_err(|_| format!("unknown sort '{arg}'"))?),
            "nearby" => Command::Nearby,
            "search" => Command::Search,
            "reset" => Command::Reset,
            "page" => Command::Page(arg.parse().map_err(|_| format!("invalid page '{arg}'"))?),
            "next" => Command::Next,
            "prev" => Command::Prev,
            "fav" if !arg.is_empty() => Command::Favorite(DogId::from(arg)),
            "favs" => Command::Favorites,
            "clear-favs" => Command::ClearFavorites,
            "match" => Command::Match,
            "close" => Command::Close,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(command)
    }
}

/// Renders filters, results and pager of `page`.
pub fn render<R, G>(page: &SearchPage<R, G>) -> String
where
    R: SessionWriter + DogReader + MatchWriter + LocationReader + ?Sized,
    G: Geolocator + ?Sized,
{
    let mut out = String::new();
    let filters = page.filters().snapshot();
    let state = page.search().state();

    let _ = writeln!(out, "breeds: {:?}", filters.selected_breeds);
    let _ = writeln!(out, "age: [{}, {}]  sort: {}", filters.age_min, filters.age_max, filters.sort);
    match &filters.nearby {
        NearbyState::On(codes) => {
            let _ = writeln!(out, "nearby: searching in {} nearby areas", codes.len());
        }
        NearbyState::Resolving => {
            let _ = writeln!(out, "nearby: finding nearby...");
        }
        NearbyState::Off => {}
    }

    if state.loading {
        let _ = writeln!(out, "loading...");
    }
    if !state.error.is_empty() {
        let _ = writeln!(out, "error: {}", state.error);
    }
    if state.has_searched && state.dogs.is_empty() {
        let _ = writeln!(out, "No dogs found. Try adjusting your filters.");
    }

    for dog in &state.dogs {
        let marker = if page.favorites().is_favorite(&dog.id) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "{marker} {:<22} {:<16} {:<24} age {:>2}  zip {}",
            dog.id, dog.name, dog.breed, dog.age, dog.zip_code
        );
    }

    let window = PageWindow::from(&state);
    if window.is_visible() {
        let pages: Vec<String> = window
            .pages
            .iter()
            .map(|p| match p {
                Some(n) if *n == window.page => format!("[{n}]"),
                Some(n) => n.to_string(),
                None => "…".to_string(),
            })
            .collect();
        let _ = writeln!(out, "pages: {}  ({} dogs)", pages.join(" "), state.total);
    }
    let _ = write!(out, "favorites: {}", page.favorites().favorite_count());

    out
}

/// Executes one command. The flag is `false` once the shell should exit.
pub async fn execute<R, G>(page: &SearchPage<R, G>, command: Command) -> (bool, String)
where
    R: SessionWriter + DogReader + MatchWriter + LocationReader + ?Sized,
    G: Geolocator + ?Sized,
{
    let output = match command {
        Command::Help => HELP.to_string(),
        Command::Show => render(page),
        Command::Breeds(text) => {
            page.filters().set_breed_search_text(text);
            page.filters().filtered_breeds().join("\n")
        }
        Command::Add(breed) => {
            page.filters().add_breed(&breed);
            format!("selected: {:?}", page.filters().selected_breeds())
        }
        Command::Remove(breed) => {
            page.filters().remove_breed(&breed);
            format!("selected: {:?}", page.filters().selected_breeds())
        }
        Command::AgeMin(text) => {
            page.filters().set_age_min(text);
            String::new()
        }
        Command::AgeMax(text) => {
            page.filters().set_age_max(text);
            String::new()
        }
        Command::Sort(sort) => {
            page.filters().set_sort(sort);
            String::new()
        }
        Command::Nearby => {
            page.toggle_nearby().await;
            render(page)
        }
        Command::Search => {
            page.apply_filters().await;
            render(page)
        }
        Command::Reset => {
            page.reset_filters().await;
            render(page)
        }
        Command::Page(n) => {
            page.change_page(n).await;
            render(page)
        }
        Command::Next => {
            let target = PageWindow::from(&page.search().state()).next();
            step(page, target).await
        }
        Command::Prev => {
            let target = PageWindow::from(&page.search().state()).previous();
            step(page, target).await
        }
        Command::Favorite(id) => {
            page.favorite_dog(&id);
            format!("favorites: {}", page.favorites().favorite_count())
        }
        Command::Favorites => page
            .favorites()
            .favorites()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        Command::ClearFavorites => {
            page.favorites().clear_favorites();
            String::new()
        }
        Command::Match => match page.generate_match().await {
            Ok(dog) => format!(
                "It's a match! {} the {} ({} years, zip {})\n{}",
                dog.name, dog.breed, dog.age, dog.zip_code, dog.img
            ),
            Err(_) => String::new(),
        },
        Command::Close => {
            page.close_match();
            String::new()
        }
        Command::Quit => return (false, String::new()),
    };
    (true, output)
}

async fn step<R, G>(page: &SearchPage<R, G>, target: Option<usize>) -> String
where
    R: SessionWriter + DogReader + MatchWriter + LocationReader + ?Sized,
    G: Geolocator + ?Sized,
{
    match target {
        Some(n) => {
            page.change_page(n).await;
            render(page)
        }
        None => "no such page".to_string(),
    }
}

/// Reads commands from `lines` until `quit` or end of input.
pub async fn run<R, G, B>(
    page: &SearchPage<R, G>,
    notifications: &NotificationLog,
    lines: &mut Lines<B>,
) -> std::io::Result<()>
where
    R: SessionWriter + DogReader + MatchWriter + LocationReader + ?Sized,
    G: Geolocator + ?Sized,
    B: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();

    stdout.write_all(render(page).as_bytes()).await?;
    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let (keep_going, output) = match Command::parse(&line) {
            Ok(command) => execute(page, command).await,
            Err(message) => (true, message),
        };

        let mut text = String::new();
        for notification in notifications.drain() {
            let _ = writeln!(text, "{notification}");
        }
        text.push_str(&output);
        stdout.write_all(text.as_bytes()).await?;

        if !keep_going {
            break;
        }
    }

    page.logout().await;
    Ok(())
}
