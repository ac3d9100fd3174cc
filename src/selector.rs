//! Interactive selector: presents the numeric menu and emits the chosen
//! trigger artifact for the watchers. While running it announces itself
//! through its own artifact so Recovery-B's existence check can find and
//! supervise it; that artifact is best-effort removed on the way out.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use ouro_core::{trigger_name, Result, SELECTOR};

use crate::cascade::builder;
use crate::cascade::namestore::{Namestore, RemoveStatus};

pub async fn run_menu(store: &Namestore) -> Result<()> {
    store
        .write(SELECTOR, builder::render(&builder::selector())?.as_bytes())
        .await?;

    println!("Please select a number from the following options:");
    for option in 1..=4 {
        println!("{option}) Option {option}");
    }

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let choice = loop {
        println!("Enter your choice (1-4):");
        match lines.next_line().await? {
            Some(line) => match line.trim().parse::<u8>() {
                Ok(n) if (1..=4).contains(&n) => break Some(n),
                Ok(_) => println!("Invalid selection. Please choose a number between 1 and 4."),
                Err(_) => println!("Please enter a valid number."),
            },
            // stdin closed before a valid choice
            None => break None,
        }
    };

    match choice {
        Some(n) => {
            let name = trigger_name(n);
            store
                .write(&name, format!("selected option {n}\n").as_bytes())
                .await?;
            println!("You selected: {n}");
            println!("Successfully created file: {name}");
            info!("trigger artifact {name} written");
        }
        None => warn!("selector input closed before a choice was made"),
    }

    if let RemoveStatus::Failed(cause) = store.remove(SELECTOR).await {
        warn!("could not remove selector artifact: {cause}");
    }
    Ok(())
}
