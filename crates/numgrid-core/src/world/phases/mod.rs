mod fluctuation;
mod growth;
mod payloads;
mod scroll;
