mod harness;

mod bus_off;
mod checksum;
mod counter;
mod heartbeat;
mod load;
mod nominal;
mod range;
mod startup;
mod timeout;
